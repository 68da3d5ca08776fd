use anyhow::{Context, Result};
use std::path::Path;

use daybrief::calendar::{import_events, parse_events, ImportMode};
use daybrief::config::BriefConfig;
use daybrief::memory::sqlite::SqliteStore;

/// Import calendar events from a JSON file into `calendar:<name>`.
///
/// Upserts by default; `refresh` replaces every stored event of that calendar.
pub fn import(config: &BriefConfig, file: &Path, calendar: &str, refresh: bool) -> Result<()> {
    let resolved = config.resolve()?;
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;

    let (events, skipped) = parse_events(&json, calendar, resolved.timezone)?;
    let mode = if refresh { ImportMode::Refresh } else { ImportMode::Upsert };

    let mut store = SqliteStore::open(&resolved.db_path)?;
    println!("Importing {} events into calendar:{calendar}...", events.len());
    let summary = import_events(&mut store, calendar, &events, mode)?;

    println!("Import complete:");
    println!("  Inserted: {}", summary.inserted);
    println!("  Updated:  {}", summary.updated);
    if skipped > 0 {
        println!("  Skipped:  {skipped} (unreadable times)");
    }
    Ok(())
}
