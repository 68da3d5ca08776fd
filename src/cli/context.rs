use anyhow::{Context, Result};
use chrono::Utc;

use daybrief::brief::ContextAssembler;
use daybrief::config::{check_days_ahead, BriefConfig};

/// Print the assembled brief context without calling the model.
pub fn context(config: &BriefConfig, days: Option<u32>, json: bool) -> Result<()> {
    let resolved = config.resolve()?;
    let store = super::open_store(&resolved)?;
    let days_ahead = check_days_ahead(days.unwrap_or(resolved.days_ahead))?;

    let context = ContextAssembler::new(&store, &resolved).build_context(Utc::now(), days_ahead)?;

    if json {
        let out = serde_json::to_string_pretty(&context).context("failed to serialize context")?;
        println!("{out}");
        return Ok(());
    }

    println!("Brief Context ({days_ahead} days ahead, language {})", context.language);
    println!("{}", "=".repeat(40));
    for (key, value) in &context.attributes {
        let mut lines = value.lines();
        println!("  {:<16} {}", key.as_str(), lines.next().unwrap_or_default());
        for line in lines {
            println!("  {:<16} {}", "", line);
        }
    }
    println!();
    println!("Facts and events ({}):", context.fact_strings.len());
    for line in &context.fact_strings {
        println!("  - {line}");
    }
    Ok(())
}
