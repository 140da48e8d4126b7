use absort_graph::{CacheError, GraphError};
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SortError>;

#[derive(Error, Debug)]
pub enum SortError {
    #[error("Name redefinition: {0} is declared more than once")]
    DuplicateIdentifier(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Invalid distance memo: {0}")]
    Cache(#[from] CacheError),

    #[error("Sorted order is not a permutation of the input ({expected} in, {actual} out)")]
    NotAPermutation { expected: usize, actual: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unknown sort order: {0} (expected topological, depth-first or breadth-first)")]
    UnknownOrder(String),
}
