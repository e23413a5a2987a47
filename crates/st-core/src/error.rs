//! Core error type.
//!
//! Only configuration validation can fail at this level.  Graph and geometry
//! crates define their own enums.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `st-core`.
pub type CoreResult<T> = Result<T, CoreError>;
