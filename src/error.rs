use std::path::PathBuf;

use thiserror::Error;

use crate::word_index::State;

#[derive(Error, Debug)]
pub enum Error {
    #[error("word source {name} unavailable: {source}")]
    SourceUnavailable {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not allocate {len} bytes for a dictionary word")]
    AllocationFailure { len: usize },

    #[error("word on line {line} is {len} bytes long, maximum is {max}")]
    OversizedWord { line: usize, len: usize, max: usize },

    #[error("cannot {operation} a word index that is {state}")]
    InvalidState {
        operation: &'static str,
        state: State,
    },

    #[error("bucket count must be at least 1")]
    InvalidBucketCount,

    #[error("invalid config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
