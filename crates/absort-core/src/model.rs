//! Declarations as seen by the sorter

use absort_graph::tree_size;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Top-level declaration kinds that can be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    #[default]
    Function,
    Class,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclKind::Function => write!(f, "function"),
            DeclKind::Class => write!(f, "class"),
        }
    }
}

/// A language-neutral syntax tree used only for structural comparison.
///
/// `kind` names the node type; `attributes` hold its scalar fields in a
/// fixed order (identifiers, literal values, flags).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SyntaxNode {
    pub kind: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: impl Into<String>) -> Self {
        SyntaxNode {
            kind: kind.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    pub fn children(&self) -> &[SyntaxNode] {
        &self.children
    }

    /// Node count, root included.
    pub fn size(&self) -> usize {
        tree_size(self, SyntaxNode::children)
    }
}

/// A named top-level declaration with its free-name dependencies.
///
/// `dependencies` may mention names outside the batch being sorted; those
/// are ignored when building the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    #[serde(default)]
    pub kind: DeclKind,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    #[serde(default)]
    pub shape: SyntaxNode,
}

impl Declaration {
    pub fn new(name: impl Into<String>, kind: DeclKind) -> Self {
        Declaration {
            name: name.into(),
            kind,
            dependencies: BTreeSet::new(),
            shape: SyntaxNode::default(),
        }
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Function)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Class)
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_shape(mut self, shape: SyntaxNode) -> Self {
        self.shape = shape;
        self
    }
}
