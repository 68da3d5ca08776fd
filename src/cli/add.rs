use anyhow::{Context, Result};
use chrono::NaiveDate;

use daybrief::config::BriefConfig;
use daybrief::memory::sqlite::SqliteStore;
use daybrief::memory::types::{NewFact, Source};

/// Store a manual fact. Without `date` the fact is evergreen.
pub fn add(
    config: &BriefConfig,
    content: &str,
    date: Option<&str>,
    uid: Option<String>,
) -> Result<()> {
    let content = content.trim();
    anyhow::ensure!(!content.is_empty(), "fact content must not be empty");

    let mut fact = match date {
        Some(raw) => {
            let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .with_context(|| format!("invalid date `{raw}`, expected YYYY-MM-DD"))?;
            NewFact::on_date(content, date, Source::manual())
        }
        None => NewFact::evergreen(content, Source::manual()),
    };
    fact.external_uid = uid;

    let store = SqliteStore::open(config.resolved_db_path())?;
    let id = store.insert_fact(&fact)?;

    match date {
        Some(d) => println!("Stored fact #{id} for {d}"),
        None => println!("Stored evergreen fact #{id}"),
    }
    Ok(())
}
