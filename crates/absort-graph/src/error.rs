use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Self-pointing edge is not accepted: {0}")]
    SelfLoop(String),

    #[error(
        "Circular dependency detected! Try detect_cycle() to find a cycle, \
         or detect_back_edge() to find back edges"
    )]
    CircularDependency,

    #[error("Node not found: {0}")]
    UnknownNode(String),

    #[error("No minimum edge in an empty or one-noded graph")]
    NoMinimumEdge,

    #[error("{{{0}, {1}}} is not an edge in the graph")]
    EdgeNotFound(String, String),

    #[error("Unconnected graph has no minimum spanning tree")]
    Disconnected,

    #[error("k should be an integer larger than 1, got {0}")]
    InvalidClusterCount(usize),

    #[error("p and q should be positive, got p={p}, q={q}")]
    InvalidPqGramShape { p: usize, q: usize },

    #[error("Failed to serialize node for digest: {0}")]
    Digest(#[from] bincode::Error),
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Key {0} is not in cache")]
    KeyNotFound(String),

    #[error("maxsize should be a positive integer, got {0}")]
    InvalidCapacity(usize),
}
