use anyhow::Result;

use daybrief::config::BriefConfig;

/// Display fact store statistics in the terminal.
pub fn stats(config: &BriefConfig, json: bool) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = daybrief::db::open_database(&db_path)?;

    let response = daybrief::memory::stats::store_stats(&conn, Some(&db_path))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("Fact Store Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total facts:         {}", response.total_facts);
    println!("  Dated:               {}", response.dated_facts);
    println!("  Evergreen:           {}", response.evergreen_facts);
    println!("  Calendar events:     {}", response.total_events);
    println!();

    println!("Facts by source:");
    for (source, count) in &response.facts_by_source {
        println!("  {:<28} {}", source, count);
    }
    println!();

    if !response.events_by_source.is_empty() {
        println!("Events by source:");
        for (source, count) in &response.events_by_source {
            println!("  {:<28} {}", source, count);
        }
        println!();
    }

    println!("Database size:         {} bytes", response.db_size_bytes);
    if let Some(ref oldest) = response.oldest_fact {
        println!("Oldest fact:           {oldest}");
    }
    if let Some(ref newest) = response.newest_fact {
        println!("Newest fact:           {newest}");
    }

    Ok(())
}
