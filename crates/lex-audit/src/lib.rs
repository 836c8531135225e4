//! Dataset Audit Library
//!
//! Pre-training data quality auditing built with Rust and Polars.
//!
//! # Overview
//!
//! An audit inspects one tabular dataset, and optionally a baseline, and
//! reports:
//!
//! - **Missingness**: null ratio per column, high ratios are scored
//! - **Low Variance**: near-constant columns
//! - **Skew**: numeric columns with a heavy tail
//! - **Leakage Risk**: column names that suggest the prediction target
//! - **Drift**: numeric columns whose distribution moved since the baseline
//!
//! The findings are weighted into a single risk score and a LOW / MEDIUM /
//! HIGH level. An optional LLM narrative explains the result.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_audit::{Auditor, ingest::load_csv};
//! use std::path::Path;
//!
//! let current = load_csv(Path::new("data/current.csv"), 1_000_000)?;
//! let baseline = load_csv(Path::new("data/train.csv"), 1_000_000)?;
//!
//! let auditor = Auditor::builder().build()?;
//! let response = auditor.audit(&current, Some(&baseline), false)?;
//!
//! println!("Risk: {} ({})", response.report.risk_level, response.report.risk_score);
//! println!("{}", serde_json::to_string_pretty(&response)?);
//! ```
//!
//! # Baseline Snapshots
//!
//! When the reference data cannot be kept around, store a per-column
//! mean/std summary instead and audit against that:
//!
//! ```rust,ignore
//! use lex_audit::baseline::{compute_baseline, read_baseline, write_baseline};
//!
//! write_baseline(&compute_baseline(&train)?, Path::new("baseline.json"))?;
//!
//! let snapshot = read_baseline(Path::new("baseline.json"))?;
//! let response = auditor.audit_against_snapshot(&current, &snapshot, false)?;
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use lex_audit::AuditConfig;
//!
//! let config = AuditConfig::builder()
//!     .drift_p_threshold(0.01)
//!     .leakage_pattern(r"(?i)^y(_|$)")
//!     .build()?;
//! let auditor = Auditor::builder().config(config).build()?;
//! ```

pub mod ai;
pub mod auditor;
pub mod baseline;
pub mod config;
pub mod drift;
pub mod error;
pub mod ingest;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use auditor::{Auditor, AuditorBuilder};
pub use config::{AuditConfig, AuditConfigBuilder, ConfigValidationError};
pub use drift::DriftDetector;
pub use error::{AuditError, Result as AuditResult, ResultExt};
pub use profiler::{
    ColumnProfiler, KeywordLeakageDetector, LeakageDetector, PatternLeakageDetector,
};
pub use reporting::{AuditRecord, RiskAggregator, RiskWeights, write_audit_record};
pub use types::{
    AuditIssues, AuditResponse, BaselineSnapshot, CheckResult, ColumnBaseline, DriftResult,
    DriftedFeature, Report, RiskLevel,
};
