//! Delivery of a finished brief to the configured channels.
//!
//! Every channel is attempted. Failures are logged and collected; only when all
//! channels fail does delivery return an error.

pub mod cli;
pub mod webhook;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::OutputTarget;
use crate::error::BriefError;

pub use cli::CliChannel;
pub use webhook::WebhookChannel;

/// A sink that accepts one finished brief.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Short label used in logs and error reports.
    fn name(&self) -> String;

    async fn deliver(&self, text: &str) -> anyhow::Result<()>;
}

/// Outcome of [`deliver_all`] when at least one channel succeeded.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: Vec<String>,
    /// `"<channel>: <error>"` for each channel that failed.
    pub failed: Vec<String>,
}

/// Build one channel per configured output.
pub fn channels_for(outputs: &[OutputTarget]) -> anyhow::Result<Vec<Box<dyn Channel>>> {
    outputs
        .iter()
        .map(|target| {
            let channel: Box<dyn Channel> = match target {
                OutputTarget::Cli => Box::new(CliChannel),
                OutputTarget::Webhook { url } => Box::new(WebhookChannel::new(url)?),
            };
            Ok(channel)
        })
        .collect()
}

pub async fn deliver_all(
    channels: &[Box<dyn Channel>],
    text: &str,
) -> Result<DeliveryReport, BriefError> {
    let mut report = DeliveryReport::default();
    for channel in channels {
        let name = channel.name();
        match channel.deliver(text).await {
            Ok(()) => {
                info!(channel = %name, "brief delivered");
                report.delivered.push(name);
            }
            Err(e) => {
                warn!(channel = %name, error = %format!("{e:#}"), "delivery failed");
                report.failed.push(format!("{name}: {e:#}"));
            }
        }
    }

    if report.delivered.is_empty() && !report.failed.is_empty() {
        return Err(BriefError::Delivery {
            failed: report.failed,
        });
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        label: &'static str,
        fail: bool,
        seen: Mutex<Vec<String>>,
    }

    impl Recording {
        fn boxed(label: &'static str, fail: bool) -> Box<dyn Channel> {
            Box::new(Self {
                label,
                fail,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Channel for Recording {
        fn name(&self) -> String {
            self.label.to_string()
        }

        async fn deliver(&self, text: &str) -> anyhow::Result<()> {
            self.seen.lock().unwrap().push(text.to_string());
            if self.fail {
                anyhow::bail!("unreachable");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn partial_failure_is_reported_not_fatal() {
        let channels = vec![Recording::boxed("a", true), Recording::boxed("b", false)];
        let report = deliver_all(&channels, "brief").await.unwrap();
        assert_eq!(report.delivered, vec!["b"]);
        assert_eq!(report.failed, vec!["a: unreachable"]);
    }

    #[tokio::test]
    async fn all_failed_is_an_error() {
        let channels = vec![Recording::boxed("a", true), Recording::boxed("b", true)];
        match deliver_all(&channels, "brief").await {
            Err(BriefError::Delivery { failed }) => assert_eq!(failed.len(), 2),
            other => panic!("expected delivery error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn every_channel_is_attempted() {
        let channels = vec![
            Recording::boxed("a", false),
            Recording::boxed("b", true),
            Recording::boxed("c", false),
        ];
        let report = deliver_all(&channels, "hello").await.unwrap();
        assert_eq!(report.delivered, vec!["a", "c"]);
    }

    #[test]
    fn channels_follow_outputs() {
        let channels = channels_for(&[
            OutputTarget::Cli,
            OutputTarget::Webhook {
                url: "https://example.com/hook".into(),
            },
        ])
        .unwrap();
        let names: Vec<String> = channels.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["cli", "webhook:https://example.com/hook"]);
    }
}
