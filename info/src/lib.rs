//! Build metadata compiled into the gatepass binaries.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The source revision, when the build sets `GATEPASS_REVISION`.
pub const REVISION: Option<&str> = option_env!("GATEPASS_REVISION");

/// The build timestamp, when the build sets `BUILD_TIMESTAMP`.
pub const BUILD_TIMESTAMP: Option<&str> = option_env!("BUILD_TIMESTAMP");
