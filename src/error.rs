use thiserror::Error;

use crate::genome::{SinkKind, SourceKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration document must be a JSON object")]
    NotAnObject,
    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
    #[error("{key} = {value} must be a finite value between 0.0 and 1.0")]
    OutOfUnitRange { key: &'static str, value: f64 },
    #[error("{key} = {value} exceeds the maximum of {max}")]
    TooLarge {
        key: &'static str,
        value: usize,
        max: usize,
    },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GeneError {
    #[error("source index {index} out of range for {kind:?} (expected < {bound})")]
    SourceIndexOutOfRange {
        kind: SourceKind,
        index: usize,
        bound: usize,
    },
    #[error("sink index {index} out of range for {kind:?} (expected < {bound})")]
    SinkIndexOutOfRange {
        kind: SinkKind,
        index: usize,
        bound: usize,
    },
}
