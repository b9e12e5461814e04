//! Command outcomes.

use std::path::PathBuf;

use serde::Serialize;

use appforge_spec::{ApplicationInfo, ValidationResult};
use appforge_templates::{FileOperation, OperationCounts};

/// Outcome of `validate`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateReport {
    pub spec_path: PathBuf,
    pub result: ValidationResult,
    /// Present when the spec is valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<ApplicationInfo>,
    pub route_count: usize,
}

impl ValidateReport {
    pub fn is_valid(&self) -> bool {
        self.result.valid
    }
}

/// Outcome of `generate`.
///
/// When validation fails, `template` is `None` and `operations` is empty:
/// nothing was written.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    pub app_name: String,
    pub validation: ValidationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    pub destination: PathBuf,
    /// Template files in manifest order, then the route metadata file.
    pub operations: Vec<FileOperation>,
}

impl GenerateReport {
    pub fn counts(&self) -> OperationCounts {
        OperationCounts::tally(&self.operations)
    }

    /// Valid spec and no failed file.
    pub fn is_success(&self) -> bool {
        self.validation.valid && !self.operations.iter().any(FileOperation::is_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appforge_templates::FileOutcome;

    fn report(validation: ValidationResult, operations: Vec<FileOperation>) -> GenerateReport {
        GenerateReport {
            app_name: "acme".to_string(),
            validation,
            template: Some("islands".to_string()),
            destination: PathBuf::from("apps/acme"),
            operations,
        }
    }

    #[test]
    fn test_success_requires_no_failures() {
        let ok = FileOperation { path: "a".into(), outcome: FileOutcome::Created };
        let skipped = FileOperation { path: "b".into(), outcome: FileOutcome::Skipped };
        assert!(report(ValidationResult::new(), vec![ok.clone(), skipped]).is_success());

        let failed = FileOperation {
            path: "c".into(),
            outcome: FileOutcome::Failed {
                kind: appforge_templates::FileErrorKind::Io,
                message: "disk full".into(),
            },
        };
        let report = report(ValidationResult::new(), vec![ok, failed]);
        assert!(!report.is_success());
        assert_eq!(report.counts().failed, 1);
    }

    #[test]
    fn test_invalid_spec_is_failure() {
        let mut validation = ValidationResult::new();
        validation.add_error("$.application.name", "missing required field");
        assert!(!report(validation, Vec::new()).is_success());
    }
}
