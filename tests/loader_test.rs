//! Integration tests for reading tree and graph files.

use std::fs;
use std::path::{Path, PathBuf};

use rstest::rstest;
use tempfile::TempDir;

use treewalk::application::{
    format_traversal, load_binary_tree, load_graph, load_nary_tree, ApplicationError, Label,
    TreeRender,
};
use treewalk::domain::{DomainError, ReverseBackwardTraversal, TraversalOrder};
use treewalk::util::testing;

fn resource(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources/trees")
        .join(name)
}

fn labels(values: &[i64]) -> Vec<Label> {
    values.iter().copied().map(Label::from).collect()
}

#[test]
fn given_full_binary_file_when_loading_then_traversals_match() {
    // Arrange
    testing::init_test_setup();

    // Act
    let tree = load_binary_tree(&resource("full_binary.toml")).unwrap();

    // Assert
    assert_eq!(tree.len(), 7);
    assert_eq!(tree.reverse_inorder(), labels(&[7, 3, 6, 1, 5, 2, 4]));
    assert_eq!(
        format_traversal(&tree.traverse(TraversalOrder::ReverseEvenLevels)),
        "[[1], [2, 3], [7, 6, 5, 4]]"
    );
}

#[test]
fn given_sparse_binary_file_when_loading_then_missing_sides_are_empty() {
    let tree = load_binary_tree(&resource("sparse_binary.toml")).unwrap();

    assert_eq!(
        format_traversal(&tree.traverse(TraversalOrder::ReverseInorder)),
        "[e, c, a, d, b]"
    );
    assert_eq!(
        format_traversal(&tree.traverse(TraversalOrder::ZigzagLevelOrder)),
        "[[a], [c, b], [d, e]]"
    );
    let rendered = tree.to_tree_string().to_string();
    assert!(rendered.contains('∅'), "missing sides are marked:\n{rendered}");
}

#[test]
fn given_general_tree_file_when_loading_then_post_order_matches() {
    let arena = load_nary_tree(&resource("general.toml")).unwrap();
    let traversal = ReverseBackwardTraversal::new(&arena);

    assert_eq!(
        traversal.traverse_recursive(arena.root()).unwrap(),
        labels(&[4, 5, 2, 6, 3, 1])
    );
    assert_eq!(
        traversal.traverse_by_depth(arena.root()).unwrap(),
        vec![labels(&[4, 5, 6]), labels(&[2, 3]), labels(&[1])]
    );
}

#[test]
fn given_graph_file_when_loading_then_passes_use_file_inputs() {
    let mut loaded = load_graph(&resource("product.toml")).unwrap();

    let z = loaded
        .graph
        .forward_pass(&loaded.inputs, &loaded.output)
        .unwrap();
    let gradients = loaded.graph.reverse_pass().unwrap();

    assert_eq!(loaded.output, "z");
    assert_eq!(z, 10.0);
    assert_eq!(gradients["x"], 7.0);
    assert_eq!(gradients["y"], 2.0);
    assert_eq!(loaded.graph.names(), vec!["x", "y", "a", "z"]);
}

#[test]
fn given_unknown_field_when_loading_then_parse_error_names_file() {
    let path = resource("invalid_binary.toml");

    let err = load_binary_tree(&path).unwrap_err();

    match err {
        ApplicationError::Parse { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn given_missing_file_when_loading_then_operation_failed() {
    let err = load_nary_tree(Path::new("/no/such/tree.toml")).unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    assert!(err.to_string().contains("/no/such/tree.toml"));
}

#[rstest]
#[case::forward_reference(
    r#"
output = "z"
[[nodes]]
name = "z"
op = "add"
inputs = ["x"]
[[nodes]]
name = "x"
op = "input"
"#,
    DomainError::UnknownNode("x".to_string())
)]
#[case::duplicate_name(
    r#"
output = "x"
[[nodes]]
name = "x"
op = "input"
[[nodes]]
name = "x"
op = "input"
"#,
    DomainError::NodeExists("x".to_string())
)]
fn given_inconsistent_graph_file_when_loading_then_domain_error(
    #[case] content: &str,
    #[case] expected: DomainError,
) {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.toml");
    fs::write(&path, content).unwrap();

    // Act
    let err = load_graph(&path).unwrap_err();

    // Assert
    match err {
        ApplicationError::Domain(actual) => assert_eq!(actual, expected),
        other => panic!("expected domain error, got {other:?}"),
    }
}

#[test]
fn given_unknown_operation_in_file_when_loading_then_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.toml");
    fs::write(
        &path,
        "output = \"x\"\n[[nodes]]\nname = \"x\"\nop = \"divide\"\n",
    )
    .unwrap();

    let err = load_graph(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::Parse { .. }));
}

#[test]
fn given_input_node_with_inputs_when_loading_then_parse_error_names_node() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.toml");
    fs::write(
        &path,
        r#"
output = "y"
[[nodes]]
name = "x"
op = "input"
[[nodes]]
name = "y"
op = "input"
inputs = ["x"]
"#,
    )
    .unwrap();

    // Act
    let err = load_graph(&path).unwrap_err();

    // Assert
    match err {
        ApplicationError::Parse { path: reported, message } => {
            assert_eq!(reported, path);
            assert!(message.contains("'y'"), "{message}");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}
