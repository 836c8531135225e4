use crate::error::Result;
use crate::types::AuditResponse;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// An audit response with the run metadata, as written by `--emit-report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Timestamp when the record was generated
    pub generated_at: String,
    /// Path to the audited file
    pub input_file: String,
    /// Path to the baseline data or snapshot, if one was used
    pub baseline_file: Option<String>,
    #[serde(flatten)]
    pub response: AuditResponse,
}

impl AuditRecord {
    pub fn new(
        input_file: impl Into<String>,
        baseline_file: Option<String>,
        response: AuditResponse,
    ) -> Self {
        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.into(),
            baseline_file,
            response,
        }
    }
}

/// Write an audit record as pretty JSON to `<output_dir>/<stem>_audit.json`.
///
/// The directory is created when missing. Returns the path written.
pub fn write_audit_record(output_dir: &Path, stem: &str, record: &AuditRecord) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let record_path = output_dir.join(format!("{}_audit.json", stem));
    let mut file = File::create(&record_path)?;
    file.write_all(serde_json::to_string_pretty(record)?.as_bytes())?;

    info!("Audit report saved: {}", record_path.display());

    Ok(record_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::RiskAggregator;
    use crate::types::CheckResult;

    #[test]
    fn test_write_audit_record() {
        let report = RiskAggregator::default().build_report((3, 2), &CheckResult::default());
        let response = AuditResponse {
            report,
            explanation: String::new(),
        };
        let record = AuditRecord::new("data/current.csv", None, response);

        let dir = std::env::temp_dir().join(format!("lex_audit_record_{}", std::process::id()));
        let path = write_audit_record(&dir, "current", &record).unwrap();

        assert_eq!(path, dir.join("current_audit.json"));
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["input_file"], "data/current.csv");
        assert_eq!(written["risk_level"], "LOW");
        assert_eq!(written["dataset_shape"], serde_json::json!([3, 2]));
        assert!(written["baseline_file"].is_null());
        assert!(written.get("generated_at").is_some());

        let restored: AuditRecord = serde_json::from_value(written).unwrap();
        assert_eq!(restored, record);

        fs::remove_dir_all(&dir).ok();
    }
}
