//! Termtree views of pytrees and their specs.

use std::fmt;

use termtree::Tree;
use tracing::instrument;

use crate::domain::node::py_str_repr;
use crate::domain::{NodeKind, PyTree, TreeSpec};

pub trait TreeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

fn keyed(key: Option<&str>, label: String) -> String {
    match key {
        Some(key) => format!("{}: {}", py_str_repr(key), label),
        None => label,
    }
}

impl TreeConvert for TreeSpec {
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build(spec: &TreeSpec, key: Option<&str>) -> Tree<String> {
            let label = match spec.kind() {
                NodeKind::Leaf => "*".to_string(),
                NodeKind::Tracked { with_grad: true } => "Tracked(*, grad=*)".to_string(),
                NodeKind::Tracked { with_grad: false } => "Tracked(*)".to_string(),
                NodeKind::None => "None".to_string(),
                kind => kind.type_name().to_string(),
            };
            let leaves: Vec<_> = match spec.kind() {
                NodeKind::Dict { keys } => keys
                    .iter()
                    .zip(spec.children())
                    .map(|(k, child)| build(child, Some(k.as_str())))
                    .collect(),
                _ => spec.children().iter().map(|c| build(c, None)).collect(),
            };
            Tree::new(keyed(key, label)).with_leaves(leaves)
        }

        build(self, None)
    }
}

impl<L: fmt::Display> TreeConvert for PyTree<L> {
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build<L: fmt::Display>(tree: &PyTree<L>, key: Option<&str>) -> Tree<String> {
            match tree {
                PyTree::Leaf(_) | PyTree::Tracked(_) | PyTree::None => {
                    Tree::new(keyed(key, tree.to_string()))
                }
                PyTree::Tuple(items) | PyTree::List(items) => {
                    Tree::new(keyed(key, tree.kind_name().to_string()))
                        .with_leaves(items.iter().map(|c| build(c, None)))
                }
                PyTree::Dict(entries) => Tree::new(keyed(key, tree.kind_name().to_string()))
                    .with_leaves(entries.iter().map(|(k, c)| build(c, Some(k.as_str())))),
            }
        }

        build(self, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::tree_structure;

    fn sample() -> PyTree<i32> {
        PyTree::dict([
            ("a", PyTree::leaf(1)),
            ("b", PyTree::list([PyTree::leaf(2), PyTree::tracked(3, Some(4))])),
        ])
    }

    #[test]
    fn given_spec_when_converted_then_dict_children_carry_keys() {
        let tree = tree_structure(&sample(), true).to_tree_string();
        assert_eq!(tree.root, "dict");
        assert_eq!(tree.leaves.len(), 2);
        assert_eq!(tree.leaves[0].root, "'a': *");
        assert_eq!(tree.leaves[1].root, "'b': list");
        assert_eq!(tree.leaves[1].leaves[1].root, "Tracked(*, grad=*)");
    }

    #[test]
    fn given_spec_when_rendered_then_output_has_one_line_per_node() {
        let rendered = tree_structure(&sample(), false).to_tree_string().to_string();
        assert_eq!(rendered.lines().count(), 5);
        assert_eq!(rendered.matches('*').count(), 3);
    }

    #[test]
    fn given_value_tree_when_converted_then_leaves_show_values() {
        let tree = sample().to_tree_string();
        assert_eq!(tree.leaves[0].root, "'a': 1");
        assert_eq!(tree.leaves[1].leaves[0].root, "2");
        assert_eq!(tree.leaves[1].leaves[1].root, "Tracked(3, grad=4)");
    }
}
