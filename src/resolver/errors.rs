//! Compatibility table construction errors.

use thiserror::Error;

/// The builtin compatibility tables are inconsistent.
///
/// These are defects in the table data, never user errors. They surface at
/// startup through [`CompatibilityResolver::builtin`](super::CompatibilityResolver::builtin)
/// before any build work starts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableIntegrityError {
    #[error("release {release}: cannot drop `{platform}`, it is not in the platform list")]
    MissingDrop { release: String, platform: String },

    #[error("release {release}: `{platform}` is listed more than once")]
    DuplicatePlatform { release: String, platform: String },

    #[error("invalid release range `{range}`: {reason}")]
    InvalidRange { range: String, reason: String },

    #[error("release ranges `{first}` and `{second}` overlap at {release}")]
    OverlappingRanges {
        first: String,
        second: String,
        release: String,
    },
}
