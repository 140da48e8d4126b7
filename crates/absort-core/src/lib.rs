//! ABSort core: declaration model, sorting configuration and the
//! dependency-ordering policy built on absort-graph

pub mod config;
pub mod error;
pub mod model;
pub mod similarity;
pub mod sorter;


pub use config::{SimilarityConfig, SortConfig, SortOrder};
pub use error::{ConfigError, Result, SortError};
pub use model::{DeclKind, Declaration, SyntaxNode};
pub use similarity::{DistanceAlgorithm, ShapeCost, SimilaritySorter, shape_label};
pub use sorter::{MAIN, dependency_graph, find_cycles, sort_declarations};
