//! In-place leaf mapping.

use tracing::{instrument, trace};

use crate::domain::PyTree;
use crate::flatten::tree_flatten_mut;

/// Call `f` on every leaf of `tree`, in flattening order, and hand back the
/// same tree.
///
/// Return values of `f` are discarded; the only observable effect is whatever
/// `f` does to each leaf through its `&mut` borrow. Nothing is copied or
/// rebuilt, so the returned reference is the one that came in.
#[instrument(level = "debug", skip(f, tree))]
pub fn tree_map_<L, F, R>(
    mut f: F,
    tree: &mut PyTree<L>,
    include_gradient_leaves: bool,
) -> &mut PyTree<L>
where
    F: FnMut(&mut L) -> R,
{
    let (leaves, spec) = tree_flatten_mut(tree, include_gradient_leaves);
    trace!(num_leaves = spec.num_leaves(), "mapping leaves in place");
    for leaf in leaves {
        let _ = f(leaf);
    }
    tree
}
