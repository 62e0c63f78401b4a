//! Error types for the platform integration
//!
//! Almost everything in this crate recovers locally: bad configuration keeps
//! the defaults, an unidentifiable device gets the generic profile and a
//! failed screen leaves the integration running without one. The types here
//! cover what is left.
//!
//! ## Error Types
//!
//! - [`SysFsError`] - A device file could not be read or written
//! - [`RegistryError`] - A capability was registered twice
//! - [`BuilderError`] - A required collaborator was not supplied
//! - [`IntegrationError`] - Anything that aborts [`build()`](crate::IntegrationBuilder::build)
//!
//! ## Example
//!
//! ```
//! use kobo_platform::{BuilderError, IntegrationError, KoboIntegration, PlatformParams};
//!
//! // No screen and no input factory
//! let result = KoboIntegration::builder(PlatformParams::default()).build();
//! assert!(matches!(
//!     result,
//!     Err(IntegrationError::Builder(BuilderError::MissingScreen))
//! ));
//! ```

use std::fmt;

/// Errors raised by [`SysFs`](crate::sysfs::SysFs) implementations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SysFsError {
    /// The file does not exist
    NotFound(String),
    /// The file exists but reading or writing it failed
    Io {
        /// Device path that was accessed
        path: String,
        /// Underlying error message
        message: String,
    },
}

impl fmt::Display for SysFsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SysFsError::NotFound(path) => write!(f, "{path}: not found"),
            SysFsError::Io { path, message } => write!(f, "{path}: {message}"),
        }
    }
}

impl std::error::Error for SysFsError {}

/// Errors raised while populating the capability registry
///
/// Identifiers are a fixed set registered once, so any of these is a
/// programming error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The identifier already has an operation bound to it
    Duplicate(&'static str),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Duplicate(identifier) => {
                write!(f, "capability '{identifier}' registered twice")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Errors raised by [`IntegrationBuilder`](crate::IntegrationBuilder) before boot starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    /// [`IntegrationBuilder::screen()`](crate::IntegrationBuilder::screen) was not called
    MissingScreen,
    /// [`IntegrationBuilder::input()`](crate::IntegrationBuilder::input) was not called
    MissingInput,
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuilderError::MissingScreen => write!(f, "A screen must be specified"),
            BuilderError::MissingInput => write!(f, "An input factory must be specified"),
        }
    }
}

impl std::error::Error for BuilderError {}

/// Fatal errors of the integration boot sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrationError {
    /// The builder was incomplete
    Builder(BuilderError),
    /// Capability registration failed
    Registry(RegistryError),
}

impl fmt::Display for IntegrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrationError::Builder(err) => write!(f, "Invalid integration setup: {err}"),
            IntegrationError::Registry(err) => write!(f, "Capability registration failed: {err}"),
        }
    }
}

impl std::error::Error for IntegrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IntegrationError::Builder(err) => Some(err),
            IntegrationError::Registry(err) => Some(err),
        }
    }
}

impl From<BuilderError> for IntegrationError {
    fn from(err: BuilderError) -> Self {
        IntegrationError::Builder(err)
    }
}

impl From<RegistryError> for IntegrationError {
    fn from(err: RegistryError) -> Self {
        IntegrationError::Registry(err)
    }
}
