//! Routing of `after-emit` failures into the compilation's collectors.

use crate::build::Compilation;
use crate::error::UploaderError;

/// Prefix on every message the uploader adds to a compilation
pub const MESSAGE_PREFIX: &str = "Sentry Plugin: ";

/// Where a failure ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorReport {
    /// Downgraded to a build warning
    Suppressed,
    /// Reported as a build error
    Reported,
}

/// Error suppression settings
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppressionPolicy {
    /// Suppress every failure
    pub suppress_errors: bool,
    /// Suppress 409 conflicts only
    pub suppress_conflict_error: bool,
}

impl SuppressionPolicy {
    /// Classify a failure
    pub fn classify(&self, error: &UploaderError) -> ErrorReport {
        if self.suppress_errors || (self.suppress_conflict_error && error.is_conflict()) {
            ErrorReport::Suppressed
        } else {
            ErrorReport::Reported
        }
    }

    /// Push the formatted failure onto the matching collector
    pub fn route(&self, error: &UploaderError, compilation: &mut Compilation) -> ErrorReport {
        let report = self.classify(error);
        let message = format!("{MESSAGE_PREFIX}{error}");
        match report {
            ErrorReport::Suppressed => {
                log::warn!("{}", message);
                compilation.warnings.push(message);
            }
            ErrorReport::Reported => {
                log::error!("{}", message);
                compilation.errors.push(message);
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequiredOption;

    fn conflict() -> UploaderError {
        UploaderError::Api {
            method: "POST".to_string(),
            url: "https://sentry.io/api/0/organizations/acme/releases/".to_string(),
            status: 409,
            body: String::new(),
        }
    }

    #[test]
    fn test_default_policy_reports() {
        let mut compilation = Compilation::default();
        let policy = SuppressionPolicy::default();
        let report = policy.route(&RequiredOption::Organization.into(), &mut compilation);
        assert_eq!(report, ErrorReport::Reported);
        assert_eq!(
            compilation.errors,
            vec!["Sentry Plugin: Must provide organization"]
        );
        assert!(compilation.warnings.is_empty());
    }

    #[test]
    fn test_conflict_suppression_only_covers_409() {
        let policy = SuppressionPolicy {
            suppress_errors: false,
            suppress_conflict_error: true,
        };
        assert_eq!(policy.classify(&conflict()), ErrorReport::Suppressed);
        assert_eq!(
            policy.classify(&RequiredOption::ApiKey.into()),
            ErrorReport::Reported
        );
    }

    #[test]
    fn test_suppress_errors_covers_everything() {
        let mut compilation = Compilation::default();
        let policy = SuppressionPolicy {
            suppress_errors: true,
            suppress_conflict_error: false,
        };
        policy.route(&RequiredOption::Project.into(), &mut compilation);
        policy.route(&conflict(), &mut compilation);
        assert!(compilation.errors.is_empty());
        assert_eq!(compilation.warnings.len(), 2);
        assert!(compilation.warnings[0].starts_with(MESSAGE_PREFIX));
    }
}
