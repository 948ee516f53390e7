//! Error types for the value model

use thiserror::Error;

use crate::Kind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("{kind} node has already been sealed")]
    AlreadySealed { kind: Kind },

    #[error("Cyclic value cannot be exported at {path}")]
    Cycle { path: String },

    #[error("Opaque value cannot be exported at {path}")]
    Opaque { path: String },

    #[error("Non-finite number {value} cannot be exported at {path}")]
    NonFiniteNumber { value: f64, path: String },
}

pub type ValueResult<T> = Result<T, ValueError>;
