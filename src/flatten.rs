//! Flatten a pytree into its ordered leaves plus a [`TreeSpec`], and rebuild a
//! tree from a spec and a replacement list of leaves.
//!
//! Flattening order is depth-first, left to right; dict entries are visited in
//! insertion order. A tracked leaf yields its data first, then its gradient
//! when gradient leaves are included and one is present.

use tracing::{debug, instrument};

use crate::domain::{NodeKind, PyTree, Tracked, TreeError, TreeResult, TreeSpec};

/// Flatten by shared reference.
#[instrument(level = "debug", skip(tree))]
pub fn tree_flatten<L>(tree: &PyTree<L>, include_gradient_leaves: bool) -> (Vec<&L>, TreeSpec) {
    let mut leaves = Vec::new();
    let spec = collect_ref(tree, include_gradient_leaves, &mut leaves);
    debug!(num_leaves = leaves.len(), kind = tree.kind_name(), "flattened tree");
    (leaves, spec)
}

/// Flatten by exclusive reference; each leaf can be mutated through the
/// returned borrows while the container itself stays in place.
#[instrument(level = "debug", skip(tree))]
pub fn tree_flatten_mut<L>(
    tree: &mut PyTree<L>,
    include_gradient_leaves: bool,
) -> (Vec<&mut L>, TreeSpec) {
    let mut leaves = Vec::new();
    let spec = collect_mut(tree, include_gradient_leaves, &mut leaves);
    debug!(num_leaves = leaves.len(), "flattened tree (mut)");
    (leaves, spec)
}

/// Flatten by value, moving the leaves out of the tree.
///
/// Gradients that are not included are dropped.
#[instrument(level = "debug", skip(tree))]
pub fn tree_flatten_owned<L>(tree: PyTree<L>, include_gradient_leaves: bool) -> (Vec<L>, TreeSpec) {
    let mut leaves = Vec::new();
    let spec = collect_owned(tree, include_gradient_leaves, &mut leaves);
    debug!(num_leaves = leaves.len(), "flattened tree (owned)");
    (leaves, spec)
}

pub fn tree_leaves<L>(tree: &PyTree<L>, include_gradient_leaves: bool) -> Vec<&L> {
    tree_flatten(tree, include_gradient_leaves).0
}

pub fn tree_structure<L>(tree: &PyTree<L>, include_gradient_leaves: bool) -> TreeSpec {
    tree_flatten(tree, include_gradient_leaves).1
}

/// Rebuild a tree of `spec`'s shape using `leaves` in flattening order.
///
/// # Errors
///
/// [`TreeError::LeafCountMismatch`] when the number of leaves differs from
/// `spec.num_leaves()`.
#[instrument(level = "debug", skip(leaves, spec), fields(expected = spec.num_leaves()))]
pub fn tree_unflatten<L, I>(leaves: I, spec: &TreeSpec) -> TreeResult<PyTree<L>>
where
    I: IntoIterator<Item = L>,
{
    let leaves: Vec<L> = leaves.into_iter().collect();
    if leaves.len() != spec.num_leaves() {
        return Err(TreeError::LeafCountMismatch {
            expected: spec.num_leaves(),
            actual: leaves.len(),
        });
    }
    let mut leaves = leaves.into_iter();
    build(&mut leaves, spec)
}

fn collect_ref<'a, L>(tree: &'a PyTree<L>, grads: bool, leaves: &mut Vec<&'a L>) -> TreeSpec {
    match tree {
        PyTree::Leaf(value) => {
            leaves.push(value);
            TreeSpec::leaf()
        }
        PyTree::None => TreeSpec::none(),
        PyTree::Tuple(items) => TreeSpec::tuple(
            items
                .iter()
                .map(|child| collect_ref(child, grads, leaves))
                .collect(),
        ),
        PyTree::List(items) => TreeSpec::list(
            items
                .iter()
                .map(|child| collect_ref(child, grads, leaves))
                .collect(),
        ),
        PyTree::Dict(entries) => TreeSpec::dict(
            entries
                .iter()
                .map(|(key, child)| (key.clone(), collect_ref(child, grads, leaves)))
                .collect(),
        ),
        PyTree::Tracked(Tracked { data, grad }) => {
            leaves.push(data);
            let with_grad = match grad {
                Some(grad) if grads => {
                    leaves.push(grad);
                    true
                }
                _ => false,
            };
            TreeSpec::tracked(with_grad)
        }
    }
}

fn collect_mut<'a, L>(
    tree: &'a mut PyTree<L>,
    grads: bool,
    leaves: &mut Vec<&'a mut L>,
) -> TreeSpec {
    match tree {
        PyTree::Leaf(value) => {
            leaves.push(value);
            TreeSpec::leaf()
        }
        PyTree::None => TreeSpec::none(),
        PyTree::Tuple(items) => TreeSpec::tuple(
            items
                .iter_mut()
                .map(|child| collect_mut(child, grads, leaves))
                .collect(),
        ),
        PyTree::List(items) => TreeSpec::list(
            items
                .iter_mut()
                .map(|child| collect_mut(child, grads, leaves))
                .collect(),
        ),
        PyTree::Dict(entries) => TreeSpec::dict(
            entries
                .iter_mut()
                .map(|(key, child)| (key.clone(), collect_mut(child, grads, leaves)))
                .collect(),
        ),
        PyTree::Tracked(Tracked { data, grad }) => {
            leaves.push(data);
            let with_grad = match grad {
                Some(grad) if grads => {
                    leaves.push(grad);
                    true
                }
                _ => false,
            };
            TreeSpec::tracked(with_grad)
        }
    }
}

fn collect_owned<L>(tree: PyTree<L>, grads: bool, leaves: &mut Vec<L>) -> TreeSpec {
    match tree {
        PyTree::Leaf(value) => {
            leaves.push(value);
            TreeSpec::leaf()
        }
        PyTree::None => TreeSpec::none(),
        PyTree::Tuple(items) => TreeSpec::tuple(
            items
                .into_iter()
                .map(|child| collect_owned(child, grads, leaves))
                .collect(),
        ),
        PyTree::List(items) => TreeSpec::list(
            items
                .into_iter()
                .map(|child| collect_owned(child, grads, leaves))
                .collect(),
        ),
        PyTree::Dict(entries) => TreeSpec::dict(
            entries
                .into_iter()
                .map(|(key, child)| (key, collect_owned(child, grads, leaves)))
                .collect(),
        ),
        PyTree::Tracked(Tracked { data, grad }) => {
            leaves.push(data);
            let with_grad = match grad {
                Some(grad) if grads => {
                    leaves.push(grad);
                    true
                }
                _ => false,
            };
            TreeSpec::tracked(with_grad)
        }
    }
}

fn next_leaf<L, I: Iterator<Item = L>>(leaves: &mut I) -> TreeResult<L> {
    // count is checked up front, so this only fires on an inconsistent spec
    leaves
        .next()
        .ok_or_else(|| TreeError::MalformedSpec("ran out of leaves while rebuilding".to_string()))
}

fn build_children<L, I: Iterator<Item = L>>(
    leaves: &mut I,
    spec: &TreeSpec,
) -> TreeResult<Vec<PyTree<L>>> {
    spec.children()
        .iter()
        .map(|child| build(leaves, child))
        .collect()
}

fn build<L, I: Iterator<Item = L>>(leaves: &mut I, spec: &TreeSpec) -> TreeResult<PyTree<L>> {
    let tree = match spec.kind() {
        NodeKind::Leaf => PyTree::Leaf(next_leaf(leaves)?),
        NodeKind::None => PyTree::None,
        NodeKind::Tuple => PyTree::Tuple(build_children(leaves, spec)?),
        NodeKind::List => PyTree::List(build_children(leaves, spec)?),
        NodeKind::Dict { keys } => {
            let children = build_children(leaves, spec)?;
            PyTree::Dict(keys.iter().cloned().zip(children).collect())
        }
        NodeKind::Tracked { with_grad } => {
            let data = next_leaf(leaves)?;
            let grad = if *with_grad {
                Some(next_leaf(leaves)?)
            } else {
                None
            };
            PyTree::Tracked(Tracked { data, grad })
        }
    };
    Ok(tree)
}
