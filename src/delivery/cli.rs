use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Write;

use super::Channel;

/// Prints the brief to stdout.
pub struct CliChannel;

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> String {
        "cli".to_string()
    }

    async fn deliver(&self, text: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{text}").context("failed to write brief to stdout")?;
        out.flush().context("failed to flush stdout")
    }
}
