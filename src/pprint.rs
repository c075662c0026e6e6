//! Render the skeleton of a [`TreeSpec`] with `*` in every leaf position.

use std::fmt;

use tracing::{debug, instrument};

use crate::domain::{TreeResult, TreeSpec};
use crate::flatten::tree_unflatten;

/// Filler leaf that prints as a single asterisk.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Placeholder;

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("*")
    }
}

impl fmt::Debug for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("*")
    }
}

/// Pretty-print the shape described by `spec`.
///
/// `{'a': *, 'b': [*, *]}` for the spec of `{"a": 1, "b": [2, 3]}`.
///
/// # Errors
///
/// Whatever [`tree_unflatten`] reports for the spec, unchanged.
#[instrument(level = "debug", skip(spec), fields(num_leaves = spec.num_leaves()))]
pub fn treespec_pprint(spec: &TreeSpec) -> TreeResult<String> {
    let placeholders = std::iter::repeat(Placeholder).take(spec.num_leaves());
    let skeleton = tree_unflatten(placeholders, spec)?;
    let rendered = skeleton.to_string();
    debug!(%rendered, "rendered tree spec");
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PyTree;
    use crate::flatten::tree_structure;
    use crate::util::testing;
    use rstest::rstest;

    #[test]
    fn given_placeholder_when_formatted_then_prints_asterisk() {
        assert_eq!(Placeholder.to_string(), "*");
        assert_eq!(format!("{:?}", Placeholder), "*");
    }

    #[test]
    fn given_dict_spec_when_pprinted_then_leaves_become_asterisks() {
        testing::init_test_setup();
        let tree = PyTree::dict([
            ("a", PyTree::leaf(1)),
            ("b", PyTree::list([PyTree::leaf(2), PyTree::leaf(3)])),
        ]);
        let spec = tree_structure(&tree, false);
        assert_eq!(treespec_pprint(&spec).unwrap(), "{'a': *, 'b': [*, *]}");
    }

    #[rstest]
    #[case(TreeSpec::list(vec![]), "[]")]
    #[case(TreeSpec::dict(vec![]), "{}")]
    #[case(TreeSpec::tuple(vec![]), "()")]
    #[case(TreeSpec::none(), "None")]
    fn given_zero_leaf_spec_when_pprinted_then_renders_empty_container(
        #[case] spec: TreeSpec,
        #[case] expected: &str,
    ) {
        let rendered = treespec_pprint(&spec).unwrap();
        assert_eq!(rendered, expected);
        assert!(!rendered.contains('*'));
    }

    #[test]
    fn given_tracked_spec_when_pprinted_then_gradient_slot_shows_only_when_included() {
        let tree = PyTree::tuple([PyTree::tracked(1.0, Some(0.5)), PyTree::leaf(2.0)]);
        let without = treespec_pprint(&tree_structure(&tree, false)).unwrap();
        let with = treespec_pprint(&tree_structure(&tree, true)).unwrap();
        assert_eq!(without, "(Tracked(*), *)");
        assert_eq!(with, "(Tracked(*, grad=*), *)");
    }

    #[test]
    fn given_spec_when_pprinted_twice_then_output_is_identical() {
        let spec = TreeSpec::tuple(vec![
            TreeSpec::leaf(),
            TreeSpec::list(vec![TreeSpec::leaf(), TreeSpec::none()]),
        ]);
        assert_eq!(treespec_pprint(&spec).unwrap(), treespec_pprint(&spec).unwrap());
        assert_eq!(treespec_pprint(&spec).unwrap(), "(*, [*, None])");
    }
}
