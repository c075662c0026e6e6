//! Tree specifications: the shape of a pytree with its leaves taken out.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::node::py_str_repr;

/// Node type recorded at each position of a [`TreeSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Leaf,
    None,
    Tuple,
    List,
    Dict { keys: Vec<String> },
    /// A gradient-tracking leaf; `with_grad` marks whether its gradient was
    /// flattened as a second leaf.
    Tracked { with_grad: bool },
}

impl NodeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Leaf => "leaf",
            NodeKind::None => "NoneType",
            NodeKind::Tuple => "tuple",
            NodeKind::List => "list",
            NodeKind::Dict { .. } => "dict",
            NodeKind::Tracked { .. } => "tracked",
        }
    }

    fn own_leaves(&self) -> usize {
        match self {
            NodeKind::Leaf => 1,
            NodeKind::Tracked { with_grad } => 1 + usize::from(*with_grad),
            _ => 0,
        }
    }
}

/// Shape descriptor produced by flattening and consumed by unflattening.
///
/// Immutable once built; `num_leaves` is computed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SpecRepr", into = "SpecRepr")]
pub struct TreeSpec {
    kind: NodeKind,
    children: Vec<TreeSpec>,
    num_leaves: usize,
}

/// Serialized form: the leaf count is derived, never stored.
#[derive(Serialize, Deserialize)]
struct SpecRepr {
    kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<TreeSpec>,
}

impl TreeSpec {
    fn build(kind: NodeKind, children: Vec<TreeSpec>) -> Self {
        let num_leaves =
            kind.own_leaves() + children.iter().map(TreeSpec::num_leaves).sum::<usize>();
        Self {
            kind,
            children,
            num_leaves,
        }
    }

    pub fn leaf() -> Self {
        Self::build(NodeKind::Leaf, Vec::new())
    }

    pub fn none() -> Self {
        Self::build(NodeKind::None, Vec::new())
    }

    pub fn tuple(children: Vec<TreeSpec>) -> Self {
        Self::build(NodeKind::Tuple, children)
    }

    pub fn list(children: Vec<TreeSpec>) -> Self {
        Self::build(NodeKind::List, children)
    }

    pub fn dict(entries: Vec<(String, TreeSpec)>) -> Self {
        let (keys, children) = entries.into_iter().unzip();
        Self::build(NodeKind::Dict { keys }, children)
    }

    pub fn tracked(with_grad: bool) -> Self {
        Self::build(NodeKind::Tracked { with_grad }, Vec::new())
    }

    /// Assemble a spec from raw parts, rejecting inconsistent combinations.
    pub fn from_parts(kind: NodeKind, children: Vec<TreeSpec>) -> TreeResult<Self> {
        let problem = match &kind {
            NodeKind::Leaf | NodeKind::None | NodeKind::Tracked { .. } if !children.is_empty() => {
                Some(format!(
                    "{} node cannot have children, got {}",
                    kind.type_name(),
                    children.len()
                ))
            }
            NodeKind::Dict { keys } if keys.len() != children.len() => Some(format!(
                "dict node has {} keys but {} children",
                keys.len(),
                children.len()
            )),
            _ => None,
        };
        match problem {
            Some(reason) => Err(TreeError::MalformedSpec(reason)),
            None => Ok(Self::build(kind, children)),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[TreeSpec] {
        &self.children
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> TreeResult<Self> {
        serde_json::from_str(json).map_err(|e| TreeError::MalformedSpec(e.to_string()))
    }
}

impl TryFrom<SpecRepr> for TreeSpec {
    type Error = TreeError;

    fn try_from(repr: SpecRepr) -> Result<Self, Self::Error> {
        TreeSpec::from_parts(repr.kind, repr.children)
    }
}

impl From<TreeSpec> for SpecRepr {
    fn from(spec: TreeSpec) -> Self {
        SpecRepr {
            kind: spec.kind,
            children: spec.children,
        }
    }
}

impl fmt::Display for TreeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let context = match &self.kind {
            NodeKind::Leaf => return f.write_str("*"),
            NodeKind::Dict { keys } => {
                format!("[{}]", keys.iter().map(|k| py_str_repr(k)).join(", "))
            }
            NodeKind::Tracked { with_grad: true } => "True".to_string(),
            NodeKind::Tracked { with_grad: false } => "False".to_string(),
            NodeKind::None | NodeKind::Tuple | NodeKind::List => "None".to_string(),
        };
        write!(
            f,
            "TreeSpec({}, {}, [{}])",
            self.kind.type_name(),
            context,
            self.children.iter().join(", ")
        )
    }
}
