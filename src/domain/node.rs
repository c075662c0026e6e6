//! Nested container values ("pytrees") generic over their leaf type.

use std::fmt;

use itertools::Itertools;

/// A leaf that tracks a gradient.
///
/// `data` is always a leaf position. `grad` only becomes one when the tree is
/// flattened with gradient leaves included.
#[derive(Debug, Clone, PartialEq)]
pub struct Tracked<L> {
    pub data: L,
    pub grad: Option<L>,
}

impl<L: fmt::Display> fmt::Display for Tracked<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.grad {
            Some(grad) => write!(f, "Tracked({}, grad={})", self.data, grad),
            None => write!(f, "Tracked({})", self.data),
        }
    }
}

/// Nested container of leaves.
///
/// Dict entries keep insertion order, which is also their flattening order.
#[derive(Debug, Clone, PartialEq)]
pub enum PyTree<L> {
    Leaf(L),
    None,
    Tuple(Vec<PyTree<L>>),
    List(Vec<PyTree<L>>),
    Dict(Vec<(String, PyTree<L>)>),
    Tracked(Tracked<L>),
}

impl<L> PyTree<L> {
    pub fn leaf(value: L) -> Self {
        PyTree::Leaf(value)
    }

    pub fn list<I: IntoIterator<Item = PyTree<L>>>(items: I) -> Self {
        PyTree::List(items.into_iter().collect())
    }

    pub fn tuple<I: IntoIterator<Item = PyTree<L>>>(items: I) -> Self {
        PyTree::Tuple(items.into_iter().collect())
    }

    pub fn dict<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, PyTree<L>)>,
    {
        PyTree::Dict(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn tracked(data: L, grad: Option<L>) -> Self {
        PyTree::Tracked(Tracked { data, grad })
    }

    /// Short type name used in spec rendering.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PyTree::Leaf(_) => "leaf",
            PyTree::None => "None",
            PyTree::Tuple(_) => "tuple",
            PyTree::List(_) => "list",
            PyTree::Dict(_) => "dict",
            PyTree::Tracked(_) => "tracked",
        }
    }
}

impl<L: fmt::Display> fmt::Display for PyTree<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PyTree::Leaf(leaf) => write!(f, "{leaf}"),
            PyTree::None => f.write_str("None"),
            PyTree::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            // one-element tuples keep the trailing comma
            PyTree::Tuple(items) if items.len() == 1 => write!(f, "({},)", items[0]),
            PyTree::Tuple(items) => write!(f, "({})", items.iter().join(", ")),
            PyTree::Dict(entries) => write!(
                f,
                "{{{}}}",
                entries
                    .iter()
                    .map(|(key, value)| format!("{}: {}", py_str_repr(key), value))
                    .join(", ")
            ),
            PyTree::Tracked(tracked) => write!(f, "{tracked}"),
        }
    }
}

/// Quote a string the way Python's `repr(str)` does.
pub(crate) fn py_str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
