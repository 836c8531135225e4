//! Explanation provider trait for abstracting LLM interactions.
//!
//! # Implementing a New Provider
//!
//! 1. Create a new file in `src/ai/` (e.g., `ollama.rs`)
//! 2. Implement the [`ExplanationProvider`] trait for your provider struct
//! 3. Export the provider in `src/ai/mod.rs`

use crate::types::Report;
use anyhow::Result;

/// Trait for services that turn an audit report into prose.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so an [`Auditor`](crate::Auditor)
/// holding one can be shared across threads.
///
/// # Error Handling
///
/// Return any failure as an error; the caller substitutes a fixed
/// placeholder text, so implementations never need their own fallback.
pub trait ExplanationProvider: Send + Sync {
    /// Produce a plain-language explanation of `report`.
    fn explain(&self, report: &Report) -> Result<String>;

    /// Provider name for logging and debugging.
    fn name(&self) -> &str;

    /// Model used by this provider, if it exposes one.
    fn model(&self) -> Option<&str> {
        None
    }
}
