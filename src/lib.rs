//! Dictionary-backed spell checking built on a fixed-size chained hash table.

pub mod config;
pub mod error;
pub mod lexer;
pub mod pipeline;
pub mod word_index;

pub use error::{Error, Result};
pub use word_index::{DuplicatePolicy, WordIndex};
