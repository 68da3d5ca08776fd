use anyhow::Result;
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use daybrief::brief::prompt::render_prompt;
use daybrief::brief::ContextAssembler;
use daybrief::config::{check_days_ahead, BriefConfig};
use daybrief::delivery::{channels_for, deliver_all};
use daybrief::error::BriefError;
use daybrief::llm::{self, OpenAiCompatClient};

/// Build today's brief, have the model write it, and deliver it.
///
/// With `dry_run` the rendered prompt is printed and no model call is made.
pub async fn brief(config: &BriefConfig, days: Option<u32>, dry_run: bool) -> Result<()> {
    let resolved = config.resolve()?;
    let store = super::open_store(&resolved)?;
    let days_ahead = check_days_ahead(days.unwrap_or(resolved.days_ahead))?;

    let context = ContextAssembler::new(&store, &resolved).build_context(Utc::now(), days_ahead)?;
    let prompt = render_prompt(&context);

    if dry_run {
        println!("--- system ---\n{}\n\n--- user ---\n{}", prompt.system, prompt.user);
        return Ok(());
    }

    let model = OpenAiCompatClient::from_config(&resolved.llm)
        .map_err(|e| BriefError::Llm(format!("{e:#}")))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .expect("valid template"),
    );
    spinner.set_message(format!("Writing brief with {}...", resolved.llm.model));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let text = llm::generate(&model, &prompt).await;
    spinner.finish_and_clear();
    let text = text?;

    let channels = channels_for(&resolved.outputs)?;
    let report = deliver_all(&channels, &text).await?;
    if !report.failed.is_empty() {
        eprintln!("Warning: delivery failed on {} channel(s):", report.failed.len());
        for failure in &report.failed {
            eprintln!("  {failure}");
        }
    }
    Ok(())
}
