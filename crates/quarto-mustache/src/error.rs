/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template rendering.
//!
//! Missing data is never an error: unknown names render as empty output and
//! unknown partials expand to nothing. The variants below cover the cases where
//! the renderer's bookkeeping can no longer be trusted, plus failures of the
//! output sink itself.

use thiserror::Error;

/// Errors that can occur while rendering a template.
#[derive(Debug, Error)]
pub enum MustacheError {
    /// A section close tag appeared while no section was open.
    #[error("Section close `{name}` has no matching section open")]
    UnopenedSection { name: String },

    /// A section close tag names a different section than the innermost open one.
    #[error("Section close `{found}` does not match open section `{expected}`")]
    MismatchedSection { expected: String, found: String },

    /// End of input was reached while a section body was still being collected.
    #[error("Section `{name}` is not closed at end of input")]
    UnclosedSection { name: String },

    /// Partials nested deeper than the configured limit.
    #[error("Partial nesting exceeds {max_depth} levels at `{name}`")]
    PartialDepthExceeded { name: String, max_depth: usize },

    /// Writing to the output sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendered output collected into a string was not valid UTF-8.
    #[error("Rendered output is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Converting caller data into a template value failed.
    #[error("Failed to convert template data: {0}")]
    Data(#[from] serde_json::Error),
}

/// Result type for rendering operations.
pub type MustacheResult<T> = Result<T, MustacheError>;
