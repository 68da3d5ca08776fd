//! Error types for the brief pipeline.
//!
//! [`StoreError`] names the store query that failed. [`BriefError`] names the
//! stage of brief generation that failed, so the CLI can tell the user whether
//! configuration, the store, the LLM call, or delivery stopped the run.
//! Everything outside these stages uses `anyhow` with context strings.

use thiserror::Error;

/// A failed fact-store query.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A SQL statement failed. `query` names the store operation.
    #[error("store query `{query}` failed")]
    Query {
        query: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    pub(crate) fn query(query: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Query { query, source }
    }
}

/// Fatal errors of a brief run, one variant per stage.
#[derive(Debug, Error)]
pub enum BriefError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to open the fact store: {0}")]
    StoreInit(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("LLM call failed: {0}")]
    Llm(String),

    #[error("delivery failed on every channel: {}", .failed.join(", "))]
    Delivery { failed: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_names_the_query() {
        let err = StoreError::query("events_ongoing")(rusqlite::Error::InvalidQuery);
        assert_eq!(err.to_string(), "store query `events_ongoing` failed");
    }

    #[test]
    fn delivery_error_lists_channels() {
        let err = BriefError::Delivery {
            failed: vec!["cli: broken pipe".into(), "webhook: HTTP 500".into()],
        };
        assert_eq!(
            err.to_string(),
            "delivery failed on every channel: cli: broken pipe, webhook: HTTP 500"
        );
    }
}
