use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Response from [`store_stats`].
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_facts: u64,
    pub evergreen_facts: u64,
    pub dated_facts: u64,
    pub facts_by_source: BTreeMap<String, u64>,
    pub total_events: u64,
    pub events_by_source: BTreeMap<String, u64>,
    pub db_size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_fact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_fact: Option<String>,
}

/// Compute fact store statistics.
///
/// `db_path` is used for file size calculation; pass None for in-memory databases.
pub fn store_stats(conn: &Connection, db_path: Option<&Path>) -> Result<StatsResponse> {
    let (total, evergreen) = count_facts(conn)?;
    let facts_by_source = count_by_source(conn, "facts")?;
    let events_by_source = count_by_source(conn, "calendar_events")?;
    let total_events = events_by_source.values().sum();
    let (oldest, newest) = fact_time_range(conn)?;

    let db_size_bytes = db_path
        .and_then(|p| std::fs::metadata(p).ok())
        .map(|m| m.len())
        .unwrap_or(0);

    Ok(StatsResponse {
        total_facts: total,
        evergreen_facts: evergreen,
        dated_facts: total - evergreen,
        facts_by_source,
        total_events,
        events_by_source,
        db_size_bytes,
        oldest_fact: oldest,
        newest_fact: newest,
    })
}

/// Total and evergreen fact counts.
fn count_facts(conn: &Connection) -> Result<(u64, u64)> {
    let (total, evergreen): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COUNT(*) - COUNT(relevance_date) FROM facts",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok((total as u64, evergreen as u64))
}

/// Row counts per stored source tag.
fn count_by_source(conn: &Connection, table: &str) -> Result<BTreeMap<String, u64>> {
    let sql = format!("SELECT source, COUNT(*) FROM {table} GROUP BY source");
    let mut stmt = conn.prepare(&sql)?;
    let rows: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows
        .into_iter()
        .map(|(source, count)| (source, count as u64))
        .collect())
}

/// Oldest and newest fact insertion timestamps.
fn fact_time_range(conn: &Connection) -> Result<(Option<String>, Option<String>)> {
    let range = conn.query_row(
        "SELECT MIN(created_at), MAX(created_at) FROM facts",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(range)
}
