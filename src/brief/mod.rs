//! Brief assembly: everything between the fact store and the LLM prompt.
//!
//! Each component takes the store as `&dyn FactStore` and its configuration by
//! reference. [`context::ContextAssembler`] is the single entry point that runs
//! them in order and merges their output.

pub mod birthdays;
pub mod context;
pub mod forecast;
pub mod ongoing;
pub mod prompt;
pub mod relevance;

pub use context::{Attribute, BriefContext, ContextAssembler};
