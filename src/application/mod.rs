//! Application layer: tree file loading and rendering
//!
//! This layer feeds files into the domain structures and formats their results.

pub mod error;
pub mod error_ext;
pub mod loader;
pub mod render;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use loader::{
    load_binary_tree, load_graph, load_nary_tree, parse_binary_tree, parse_graph,
    parse_nary_tree, Label, LoadedGraph,
};
pub use render::{format_levels, format_sequence, format_traversal, TreeRender};
