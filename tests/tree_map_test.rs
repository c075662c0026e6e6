//! Integration tests for in-place leaf mapping.

use rstest::rstest;

use pytree::util::testing;
use pytree::{tree_flatten, tree_map_, tree_structure, PyTree};

fn nested() -> PyTree<i64> {
    PyTree::dict([
        ("weights", PyTree::list([PyTree::leaf(1), PyTree::leaf(2)])),
        (
            "state",
            PyTree::tuple([PyTree::None, PyTree::tracked(3, Some(-3)), PyTree::leaf(4)]),
        ),
        ("empty", PyTree::Dict(vec![])),
    ])
}

fn deep() -> PyTree<i64> {
    PyTree::list([PyTree::list([PyTree::list([PyTree::tuple([PyTree::leaf(9)])])])])
}

#[rstest]
#[case::nested(nested(), false)]
#[case::nested_with_grads(nested(), true)]
#[case::deep(deep(), false)]
#[case::single_leaf(PyTree::leaf(5), false)]
#[case::leafless(PyTree::tuple([PyTree::None]), true)]
fn given_tree_when_mapped_then_visits_exactly_the_flattened_leaves(
    #[case] mut tree: PyTree<i64>,
    #[case] grads: bool,
) {
    testing::init_test_setup();
    let expected: Vec<i64> = tree_flatten(&tree, grads).0.into_iter().copied().collect();

    let mut visited = Vec::new();
    tree_map_(|leaf| visited.push(*leaf), &mut tree, grads);

    assert_eq!(visited, expected);
}

#[rstest]
#[case::nested(nested(), true)]
#[case::deep(deep(), false)]
fn given_tree_when_mapped_then_shape_is_unchanged(#[case] mut tree: PyTree<i64>, #[case] grads: bool) {
    let before = tree_structure(&tree, grads);
    let after = tree_structure(tree_map_(|leaf| *leaf = 0, &mut tree, grads), grads);
    assert_eq!(before, after);
}

#[test]
fn given_mutating_function_when_mapped_then_changes_land_in_original_tree() {
    let mut tree = nested();
    tree_map_(|leaf| *leaf = *leaf * *leaf, &mut tree, true);
    assert_eq!(
        tree.to_string(),
        "{'weights': [1, 4], 'state': (None, Tracked(9, grad=9), 16), 'empty': {}}"
    );
}

#[test]
fn given_gradients_excluded_when_mapped_then_gradient_is_untouched() {
    let mut tree = nested();
    tree_map_(|leaf| *leaf += 1, &mut tree, false);
    assert_eq!(
        tree.to_string(),
        "{'weights': [2, 3], 'state': (None, Tracked(4, grad=-3), 5), 'empty': {}}"
    );
}

#[test]
fn given_returned_handle_when_used_then_it_is_the_input_tree() {
    let mut tree = deep();
    let returned = tree_map_(|leaf| *leaf -= 9, &mut tree, false);
    // mutate through the returned handle; the caller's tree must see it
    *returned = PyTree::leaf(42);
    assert_eq!(tree, PyTree::leaf(42));
}
