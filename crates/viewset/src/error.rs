//! Error types for view registration and rendering.
//!
//! This module provides [`ViewError`], the single error type returned by every
//! public operation. It wraps the underlying engine's errors so callers can
//! match on the failure category without depending on minijinja directly.

use std::path::PathBuf;

/// Error type for view registration, compilation and rendering.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// No file source was configured before templates were compiled.
    #[error("no file source configured")]
    NoSource,

    /// A file pattern matched zero files.
    #[error("template: pattern matches no files: `{pattern}`")]
    NoMatch {
        /// The pattern that matched nothing
        pattern: String,
    },

    /// A file pattern could not be parsed.
    #[error("invalid file pattern `{pattern}`: {message}")]
    Pattern {
        /// The offending pattern
        pattern: String,
        /// Parser message
        message: String,
    },

    /// A source file could not be read from the file source.
    #[error("failed to read template file {name}: {message}")]
    Read {
        /// Name of the file within the source
        name: String,
        /// Error message
        message: String,
    },

    /// A source file is not a valid template.
    #[error("failed to parse template {view} ({file}): {source}")]
    Parse {
        /// The view being compiled
        view: String,
        /// The source file that failed to parse
        file: String,
        /// Engine error
        source: minijinja::Error,
    },

    /// The requested view is not registered.
    #[error("template not found: {name}")]
    NotFound {
        /// The name that was requested
        name: String,
    },

    /// The template failed while executing against the supplied data.
    #[error("render template {name} failed: {source}")]
    Execute {
        /// The view being rendered
        name: String,
        /// Engine error
        source: minijinja::Error,
    },

    /// The configuration document is invalid.
    #[error("invalid view configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    /// A configuration file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path that failed to read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl ViewError {
    /// Returns `true` for a lookup of an unregistered view.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ViewError::NotFound { .. })
    }

    /// Returns `true` when a pattern matched no files.
    pub fn is_no_match(&self) -> bool {
        matches!(self, ViewError::NoMatch { .. })
    }
}
