use crate::error::{ReportError, Result};
use crate::types::{ReportFormat, ReportVariant};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// File name constants
// ---------------------------------------------------------------------------

pub const FAILED_SUFFIX: &str = "_failed";
pub const JSON_SUFFIX: &str = ".json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Directory holding one matrix's per-step report files.
pub fn report_dir(reports_root: &Path, matrix_short_name: &str) -> PathBuf {
    reports_root.join(matrix_short_name)
}

/// Report file for one (step, format, variant) inside a matrix directory.
/// JSON has no failed-only variant and ignores `variant`.
pub fn report_file(
    report_dir: &Path,
    step_safe_name: &str,
    format: ReportFormat,
    variant: ReportVariant,
) -> PathBuf {
    let name = match (format, variant) {
        (ReportFormat::Html, ReportVariant::Complete) => step_safe_name.to_string(),
        (ReportFormat::Html, ReportVariant::FailedOnly) => {
            format!("{step_safe_name}{FAILED_SUFFIX}")
        }
        (ReportFormat::Json, _) => format!("{step_safe_name}{JSON_SUFFIX}"),
    };
    report_dir.join(name)
}

/// Identifier embedded in a rendered fragment so later patches can target
/// the right element.
pub fn container_id(step_safe_name: &str, index: u32) -> String {
    format!("{step_safe_name}_action_{index}")
}

// ---------------------------------------------------------------------------
// Safe-name validation
// ---------------------------------------------------------------------------

static SAFE_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn safe_name_re() -> &'static Regex {
    SAFE_NAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap())
}

/// Validates a matrix short name or step safe name before it becomes part of
/// a report path.
pub fn validate_safe_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 255 || !safe_name_re().is_match(name) {
        return Err(ReportError::InvalidName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_safe_names() {
        for name in ["matrix1", "Step_2", "a", "run-03.retry", "X"] {
            validate_safe_name(name).unwrap_or_else(|_| panic!("expected valid: {name}"));
        }
    }

    #[test]
    fn invalid_safe_names() {
        for name in ["", ".hidden", "-dash", "has space", "a/b", "a\\b", "tab\there"] {
            assert!(validate_safe_name(name).is_err(), "expected invalid: {name}");
        }
    }

    #[test]
    fn report_file_layout() {
        let dir = Path::new("/reports/matrix1");
        assert_eq!(
            report_file(dir, "step1", ReportFormat::Html, ReportVariant::Complete),
            PathBuf::from("/reports/matrix1/step1")
        );
        assert_eq!(
            report_file(dir, "step1", ReportFormat::Html, ReportVariant::FailedOnly),
            PathBuf::from("/reports/matrix1/step1_failed")
        );
        assert_eq!(
            report_file(dir, "step1", ReportFormat::Json, ReportVariant::Complete),
            PathBuf::from("/reports/matrix1/step1.json")
        );
        assert_eq!(
            report_file(dir, "step1", ReportFormat::Json, ReportVariant::FailedOnly),
            PathBuf::from("/reports/matrix1/step1.json")
        );
    }

    #[test]
    fn container_ids_embed_step_and_index() {
        assert_eq!(container_id("step1", 1), "step1_action_1");
        assert_eq!(container_id("step1", 42), "step1_action_42");
    }
}
