//! User-facing error taxonomy.
//!
//! Setup errors stop the run before any build starts. Build failures are
//! only raised once every task has finished.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::builder::task::BuildFailure;
use crate::resolver::errors::TableIntegrityError;
use crate::util::diagnostic::{suggestions, Diagnostic};

#[derive(Debug, Error, MietteDiagnostic)]
pub enum GoxError {
    #[error("no valid platforms to build for")]
    #[diagnostic(
        code(gox::config::no_platforms),
        help("If you specified a value for --os, --arch or --osarch, make sure it is valid")
    )]
    NoPlatforms {
        /// Toolchain version the platform set was chosen for
        version: String,
        /// Filters as given, e.g. `--os="beos"`
        filters: Vec<String>,
    },

    #[error("invalid output template `{template}`: {reason}")]
    #[diagnostic(code(gox::config::invalid_output_template))]
    InvalidOutputTemplate { template: String, reason: String },

    #[error("`{command}` executable must be on the PATH")]
    #[diagnostic(code(gox::toolchain::unavailable))]
    ToolchainUnavailable { command: String },

    #[error("{} errors occurred", .failures.len())]
    #[diagnostic(code(gox::build::failed))]
    BuildFailed { failures: Vec<BuildFailure> },

    #[error("compatibility tables are inconsistent: {0}")]
    #[diagnostic(code(gox::internal::table_integrity))]
    TableIntegrity(#[from] TableIntegrityError),
}

impl GoxError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GoxError::NoPlatforms { version, filters } => {
                let mut diag = Diagnostic::error(self.to_string())
                    .with_context(format!("platforms were chosen for {}", version));
                if !filters.is_empty() {
                    diag = diag.with_context(format!("filters: {}", filters.join(" ")));
                }
                diag.with_suggestion(suggestions::CHECK_FILTERS)
                    .with_suggestion(suggestions::LIST_PLATFORMS)
            }

            GoxError::InvalidOutputTemplate { .. } => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::OUTPUT_VARIABLES)
            }

            GoxError::ToolchainUnavailable { .. } => Diagnostic::error(self.to_string())
                .with_suggestion(suggestions::INSTALL_GO)
                .with_suggestion(suggestions::GOCMD),

            GoxError::BuildFailed { failures } => {
                let mut diag = Diagnostic::error(self.to_string());
                for failure in failures {
                    diag = diag.with_context(failure.to_string());
                }
                diag.with_suggestion(suggestions::VERBOSE)
            }

            GoxError::TableIntegrity(e) => Diagnostic::error(self.to_string())
                .with_context(format!("{:?}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::Platform;

    #[test]
    fn test_no_platforms_diagnostic() {
        let err = GoxError::NoPlatforms {
            version: "go1.20".to_string(),
            filters: vec!["--os=\"beos\"".to_string()],
        };
        let out = err.to_diagnostic().format(false);

        assert!(out.starts_with("error: no valid platforms to build for"));
        assert!(out.contains("platforms were chosen for go1.20"));
        assert!(out.contains("filters: --os=\"beos\""));
        assert!(out.contains("gox --osarch-list"));
    }

    #[test]
    fn test_build_failed_lists_every_failure() {
        let err = GoxError::BuildFailed {
            failures: vec![
                BuildFailure {
                    platform: Platform::new("windows", "arm", true),
                    package_path: "example.com/app".to_string(),
                    message: "exit status: 1".to_string(),
                },
                BuildFailure {
                    platform: Platform::new("plan9", "386", false),
                    package_path: "example.com/app".to_string(),
                    message: "exit status: 2".to_string(),
                },
            ],
        };

        assert_eq!(err.to_string(), "2 errors occurred");
        let out = err.to_diagnostic().format(false);
        assert!(out.contains("windows/arm error: exit status: 1"));
        assert!(out.contains("plan9/386 error: exit status: 2"));
    }

    #[test]
    fn test_toolchain_unavailable_message() {
        let err = GoxError::ToolchainUnavailable {
            command: "go1.99".to_string(),
        };
        assert_eq!(err.to_string(), "`go1.99` executable must be on the PATH");
    }

    #[test]
    fn test_miette_codes() {
        let err = GoxError::InvalidOutputTemplate {
            template: "{{.Nope}}".to_string(),
            reason: "unknown variable".to_string(),
        };
        let code = MietteDiagnostic::code(&err).map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("gox::config::invalid_output_template"));
    }

    #[test]
    fn test_from_table_integrity() {
        let err: GoxError = TableIntegrityError::MissingDrop {
            release: "1.5".to_string(),
            platform: "nacl/arm".to_string(),
        }
        .into();
        assert!(err.to_string().contains("cannot drop `nacl/arm`"));
    }
}
