//! Renderer error types.

use std::fmt;

use quill_config::ConfigError;

/// Error raised while rendering a tree.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// A required input was absent.
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    /// Child traversal was requested on a leaf node.
    #[error("Cannot write children of leaf node `{kind}`")]
    NotAContainer { kind: &'static str },

    /// Container nesting exceeded the configured limit.
    #[error("Nesting depth {depth} exceeds the limit of {max}")]
    StructureTooDeep { depth: usize, max: usize },

    /// The output sink rejected a write.
    #[error("Output sink rejected write")]
    Sink(#[from] fmt::Error),

    /// Renderer options failed validation.
    #[error("Invalid renderer options: {0}")]
    Options(#[from] ConfigError),

    /// Failure raised by an extension writer or observer.
    #[error("{0}")]
    Extension(String),
}
