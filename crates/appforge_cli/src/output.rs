//! Human-readable rendering of command reports.

use appforge_spec::ValidationResult;
use appforge_templates::{FileOperation, FileOutcome};

/// Print errors and warnings, one per line with their location.
pub fn print_issues(result: &ValidationResult) {
    for error in &result.errors {
        println!("   ❌ {}", error);
    }
    for warning in &result.warnings {
        println!("   ⚠️  {}", warning);
    }
}

/// One line per file, in the order the operations were produced.
pub fn print_operations(operations: &[FileOperation]) {
    for op in operations {
        println!("   {} {} ({})", marker(&op.outcome), op.path.display(), op.outcome);
    }
}

fn marker(outcome: &FileOutcome) -> &'static str {
    match outcome {
        FileOutcome::Created => "✅",
        FileOutcome::Overwritten => "♻️ ",
        FileOutcome::Skipped => "⏭️ ",
        FileOutcome::Failed { .. } => "❌",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appforge_templates::FileErrorKind;

    #[test]
    fn test_markers() {
        assert_eq!(marker(&FileOutcome::Created), "✅");
        assert_eq!(
            marker(&FileOutcome::Failed {
                kind: FileErrorKind::Io,
                message: String::new()
            }),
            "❌"
        );
    }
}
