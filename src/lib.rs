//! # pytree
//!
//! Helpers over nested containers ("pytrees"):
//!
//! - [`tree_map_`] calls a side-effecting function on every leaf, in
//!   flattening order, and hands the same tree back.
//! - [`treespec_pprint`] renders the skeleton of a [`TreeSpec`] with `*` in
//!   every leaf position.
//!
//! Both sit on [`flatten`], which turns a [`PyTree`] into its ordered leaves
//! plus a [`TreeSpec`] and rebuilds trees from a spec.
//!
//! ```
//! use pytree::{tree_map_, tree_structure, treespec_pprint, PyTree};
//!
//! let mut tree = PyTree::dict([
//!     ("a", PyTree::leaf(1)),
//!     ("b", PyTree::list([PyTree::leaf(2), PyTree::leaf(3)])),
//! ]);
//! tree_map_(|x| *x *= 10, &mut tree, false);
//! assert_eq!(tree.to_string(), "{'a': 10, 'b': [20, 30]}");
//!
//! let spec = tree_structure(&tree, false);
//! assert_eq!(treespec_pprint(&spec).unwrap(), "{'a': *, 'b': [*, *]}");
//! ```

pub mod cli;
pub mod config;
pub mod document;
pub mod domain;
pub mod errors;
pub mod exitcode;
pub mod flatten;
pub mod inplace;
pub mod pprint;
pub mod tree_traits;
pub mod util;

pub use domain::{NodeKind, PyTree, Tracked, TreeError, TreeResult, TreeSpec};
pub use flatten::{
    tree_flatten, tree_flatten_mut, tree_flatten_owned, tree_leaves, tree_structure,
    tree_unflatten,
};
pub use inplace::tree_map_;
pub use pprint::{treespec_pprint, Placeholder};
pub use tree_traits::TreeConvert;
