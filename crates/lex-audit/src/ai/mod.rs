//! LLM-written explanations of audit reports.
//!
//! Explanations are best-effort. [`explain_or_placeholder`] never fails: a
//! missing provider or any provider error yields [`EXPLANATION_PLACEHOLDER`].
//!
//! # Feature Flag
//!
//! The [`ExplanationProvider`] trait is always available for custom
//! implementations; the OpenRouter client needs the `ai` feature (default).
//!
//! ```toml
//! # Disable the HTTP client for a smaller binary
//! lex-audit = { version = "0.1", default-features = false }
//! ```

mod provider;
pub use provider::ExplanationProvider;

#[cfg(feature = "ai")]
mod openrouter;

#[cfg(feature = "ai")]
pub use openrouter::{
    API_KEY_ENV, MODEL_ENV, OpenRouterConfig, OpenRouterConfigBuilder, OpenRouterProvider,
};

use crate::types::Report;
use tracing::{info, warn};

/// Text returned whenever no explanation could be generated.
pub const EXPLANATION_PLACEHOLDER: &str = "LLM explanation placeholder.";

/// Explain `report` with `provider`, falling back to the placeholder.
pub fn explain_or_placeholder(provider: Option<&dyn ExplanationProvider>, report: &Report) -> String {
    let Some(provider) = provider else {
        info!("No explanation provider configured; using placeholder");
        return EXPLANATION_PLACEHOLDER.to_string();
    };

    match provider.explain(report) {
        Ok(text) => text,
        Err(e) => {
            warn!(
                "Explanation from {} ({}) failed: {}",
                provider.name(),
                provider.model().unwrap_or("default model"),
                e
            );
            EXPLANATION_PLACEHOLDER.to_string()
        }
    }
}
