use thiserror::Error;

/// Stable machine-readable error codes surfaced to loaders.
pub mod codes {
    pub const MODULE_NOT_FOUND: &str = "MODULE_NOT_FOUND";
    pub const INVALID_PACKAGE_MAIN: &str = "INVALID_PACKAGE_MAIN";
    pub const DESCRIPTOR_PARSE_ERROR: &str = "DESCRIPTOR_PARSE_ERROR";
    pub const INVALID_BASE_DIRECTORY: &str = "INVALID_BASE_DIRECTORY";
}

/// Resolution error.
///
/// Internal fallback attempts (missing file at one extension, missing
/// descriptor, no exports match) are control flow, not errors; only true
/// exhaustion or a descriptor policy violation produces one of these.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The specifier exhausted every candidate chain.
    #[error("Cannot find module '{specifier}'")]
    ModuleNotFound { specifier: String, basedir: String },

    /// A descriptor's `main` field exists but is not a string.
    #[error("Package {specifier} main must be a string")]
    InvalidPackageMain { specifier: String },

    /// Malformed JSON in a `package.json`. Always fatal, never treated as
    /// "no descriptor".
    #[error("Failed to parse package descriptor at {path}: {source}")]
    DescriptorParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The supplied base directory does not exist in the store.
    #[error("Base directory '{path}' does not exist")]
    InvalidBaseDirectory { path: String },
}

impl ResolveError {
    /// Stable machine code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ModuleNotFound { .. } => codes::MODULE_NOT_FOUND,
            Self::InvalidPackageMain { .. } => codes::INVALID_PACKAGE_MAIN,
            Self::DescriptorParse { .. } => codes::DESCRIPTOR_PARSE_ERROR,
            Self::InvalidBaseDirectory { .. } => codes::INVALID_BASE_DIRECTORY,
        }
    }

    pub(crate) fn not_found(specifier: &str, basedir: &str) -> Self {
        Self::ModuleNotFound {
            specifier: specifier.to_string(),
            basedir: basedir.to_string(),
        }
    }

    pub(crate) fn invalid_main(specifier: &str) -> Self {
        Self::InvalidPackageMain {
            specifier: specifier.to_string(),
        }
    }
}
