//! Personal daily brief: a local fact store of dated notes, calendar events, and
//! weather forecasts, condensed each morning into an LLM-written summary.
//!
//! Importers append to a SQLite store. When a brief is requested, the
//! [`brief`] pipeline selects what is relevant to the next few days and hands a
//! structured context to the prompt template:
//!
//! | Stage | Output |
//! |-------|--------|
//! | **Relevance** | Facts dated inside the window, evergreen facts, overlapping events |
//! | **Forecasts** | Newest forecast per date, plus notices for revised dates |
//! | **Ongoing** | Events in progress right now |
//! | **Birthdays** | Family members whose birthday is today, with age |
//!
//! # Architecture
//!
//! - **Storage**: SQLite (WAL) behind the [`memory::FactStore`] read contract
//! - **Time**: UTC in storage, the configured IANA timezone for display and day boundaries
//! - **Forecasts**: append-only; reconciled at read time, newest wins
//! - **Model**: any OpenAI-compatible chat completions endpoint
//!
//! # Modules
//!
//! - [`config`]: TOML config, env overrides, and the single defaults step
//! - [`db`]: database open, schema, migrations, and health checks
//! - [`memory`]: record types, the store contract, and its SQLite implementation
//! - [`brief`]: relevance, forecasts, ongoing events, birthdays, context, prompt
//! - [`calendar`] / [`weather`]: importers
//! - [`llm`] / [`delivery`]: the model call and output channels

pub mod brief;
pub mod calendar;
pub mod config;
pub mod db;
pub mod delivery;
pub mod error;
pub mod llm;
pub mod memory;
pub mod weather;
