//! CLI `doctor` command: check configuration and the database, print a report.

use anyhow::{Context, Result};

use daybrief::config::BriefConfig;
use daybrief::db;

pub fn doctor(config: &BriefConfig) -> Result<()> {
    println!("Daybrief Health Report");
    println!("======================");
    println!();

    match config.resolve() {
        Ok(resolved) => {
            println!("Configuration:     OK");
            println!("  Location:        {}", resolved.location.name);
            println!("  Timezone:        {}", resolved.timezone.name());
            println!("  Language:        {}", resolved.language);
            println!("  Outputs:         {}", resolved.outputs.len());
            if resolved.location.coordinates().is_err() {
                println!("  WARNING: no coordinates set, `daybrief weather` will fail.");
            }
        }
        Err(e) => println!("Configuration:     INVALID ({e})"),
    }
    println!();

    let db_path = config.resolved_db_path();
    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `daybrief add` or `daybrief import` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;

    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!();
    println!("Row counts:");
    println!("  Facts:           {}", report.fact_count);
    println!("  Calendar events: {}", report.event_count);
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Restore from a backup: cp backup.db {}", db_path.display());
        println!(
            "  2. Or delete the file and re-run your imports; \
             forecasts refill on the next `daybrief weather`."
        );
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
