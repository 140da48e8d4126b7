//! Sorting configuration, loadable from TOML

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How dependencies shape the output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Strongly connected components, dependents before their dependencies.
    #[default]
    Topological,
    DepthFirst,
    BreadthFirst,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortOrder::Topological => "topological",
            SortOrder::DepthFirst => "depth-first",
            SortOrder::BreadthFirst => "breadth-first",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SortOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "topological" => Ok(SortOrder::Topological),
            "depth-first" | "dfs" => Ok(SortOrder::DepthFirst),
            "breadth-first" | "bfs" => Ok(SortOrder::BreadthFirst),
            _ => Err(ConfigError::UnknownOrder(s.to_string())),
        }
    }
}

/// Same-rank tie-break by structural similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// When false, same-rank declarations keep their input order.
    pub enabled: bool,
    /// Zhang-Shasha is used when every tree has at most this many nodes,
    /// PQ-Gram otherwise.
    pub exact_size_threshold: usize,
    /// Groups larger than this are clustered instead of fully compared.
    pub cluster_threshold: usize,
    pub cluster_k: usize,
    /// Clustering seed. Defaults to the group size.
    pub seed: Option<u64>,
    /// Capacity of the pairwise distance memo.
    pub memo_capacity: usize,
    pub pq_p: usize,
    pub pq_q: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exact_size_threshold: 10,
            cluster_threshold: 10,
            cluster_k: 3,
            seed: None,
            memo_capacity: 1024,
            pq_p: 2,
            pq_q: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    pub order: SortOrder,
    /// Reverse the whole output (before `main` is pinned).
    pub reverse: bool,
    /// Move a declaration named `main` to the very end.
    pub pin_main: bool,
    /// Order classes and functions as two separate blocks, classes first.
    pub separate_kinds: bool,
    pub similarity: SimilarityConfig,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            order: SortOrder::default(),
            reverse: false,
            pin_main: true,
            separate_kinds: false,
            similarity: SimilarityConfig::default(),
        }
    }
}

impl SortConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
