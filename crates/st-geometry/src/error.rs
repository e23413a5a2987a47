//! Geometry error type.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("polyline needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    #[error("packed buffer ends inside a varint at byte {offset}")]
    TruncatedVarint { offset: usize },

    #[error("varint at byte {offset} does not fit in 64 bits")]
    VarintOverflow { offset: usize },

    #[error("invalid elevation profile: {0}")]
    InvalidProfile(String),
}

pub type GeometryResult<T> = Result<T, GeometryError>;
