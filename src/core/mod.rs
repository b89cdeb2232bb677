//! Core data types.

pub mod platform;
pub mod platform_filter;
pub mod release;

pub use platform::Platform;
pub use platform_filter::PlatformFilter;
pub use release::{ReleaseIdentifier, VersionParseError, VersionRange};
