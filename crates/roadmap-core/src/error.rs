use thiserror::Error;

use crate::status::Status;

/// Errors raised by tree mutations. The tree is left unchanged whenever one
/// of these is returned.
#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    #[error("Node {id} not found")]
    NodeNotFound { id: String },

    #[error("Parent node {id} not found")]
    ParentNotFound { id: String },

    #[error("Node id {id} is already used in this roadmap")]
    DuplicateId { id: String },

    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Progress value '{0}' is not a number")]
    NonNumericProgress(String),

    #[error("Progress {0} is outside 0..=100")]
    ProgressOutOfRange(i32),

    #[error("Progress weight {0} must be a positive number")]
    InvalidWeight(f64),

    #[error("The root node cannot be removed")]
    RootImmutable,

    #[error("Status transition {from} -> {to} is not allowed")]
    TransitionNotAllowed { from: Status, to: Status },
}
