//! Risk aggregation and report output.
//!
//! [`RiskAggregator`] turns the raw [`CheckResult`](crate::types::CheckResult)
//! into a weighted [`Report`](crate::types::Report); drift is folded in
//! afterwards with [`Report::merge_drift`](crate::types::Report::merge_drift).
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_audit::reporting::{AuditRecord, RiskAggregator, write_audit_record};
//!
//! let mut report = RiskAggregator::default().build_report(shape, &checks);
//! report.merge_drift(drift);
//!
//! let record = AuditRecord::new("data/current.csv", None, response);
//! write_audit_record(Path::new("reports"), "current", &record)?;
//! ```

mod record;
mod risk;

pub use record::{AuditRecord, write_audit_record};
pub use risk::{RiskAggregator, RiskWeights};
