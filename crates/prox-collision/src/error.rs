//! Error types for prox-collision.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollisionError {
    #[error("invalid tolerance: {0}")]
    InvalidTolerance(String),

    #[error("iteration budget must be positive")]
    InvalidIterationBudget,

    #[error("simplex already holds 4 vertices")]
    SimplexFull,

    #[error("simplex holds {have} vertices, {want} requested")]
    SimplexTooSmall { have: usize, want: usize },

    #[error("unknown body handle: {0}")]
    UnknownBody(usize),
}

pub type Result<T> = std::result::Result<T, CollisionError>;
