//! Workspace base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant through `#[from]`.

use thiserror::Error;

/// Errors raised while loading or validating an experiment configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A recognised key carries a value outside its allowed range.
    #[error("configuration error: {0}")]
    Config(String),

    /// The configuration contains a key this workspace does not recognise.
    #[error("configuration error: unrecognized key `{0}`")]
    UnknownKey(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `rm-core`.
pub type CoreResult<T> = Result<T, CoreError>;
