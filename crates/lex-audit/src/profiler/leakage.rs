//! Name-based target-leakage detectors.
//!
//! A detector answers one question: does this column name suggest the
//! column encodes the prediction target? The profiler flags a column when
//! any of its detectors says yes, so new heuristics are added by composing
//! detectors rather than editing the profiler.
//!
//! Closures work directly:
//!
//! ```rust,ignore
//! use lex_audit::Auditor;
//!
//! let auditor = Auditor::builder()
//!     .leakage_detector(|name: &str| name.ends_with("_after_event"))
//!     .build()?;
//! ```

use regex::Regex;

/// Capability to judge a column name as possible target leakage.
pub trait LeakageDetector: Send + Sync {
    /// Whether the column name suggests target leakage.
    fn is_leakage(&self, column: &str) -> bool;

    /// Short description used in logs.
    fn describe(&self) -> String {
        "custom detector".to_string()
    }
}

impl<F> LeakageDetector for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_leakage(&self, column: &str) -> bool {
        self(column)
    }
}

/// Case-insensitive substring match against a fixed keyword set.
#[derive(Debug, Clone)]
pub struct KeywordLeakageDetector {
    keywords: Vec<String>,
}

impl KeywordLeakageDetector {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordLeakageDetector {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_LEAKAGE_KEYWORDS)
    }
}

impl LeakageDetector for KeywordLeakageDetector {
    fn is_leakage(&self, column: &str) -> bool {
        let lower = column.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    fn describe(&self) -> String {
        format!("keywords {:?}", self.keywords)
    }
}

/// Regular-expression match against the raw column name.
#[derive(Debug, Clone)]
pub struct PatternLeakageDetector {
    pattern: Regex,
}

impl PatternLeakageDetector {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl LeakageDetector for PatternLeakageDetector {
    fn is_leakage(&self, column: &str) -> bool {
        self.pattern.is_match(column)
    }

    fn describe(&self) -> String {
        format!("pattern /{}/", self.pattern.as_str())
    }
}
