//! Traversals over binary trees, general trees and computation graphs.
//!
//! - [`domain`]: tree and graph structures with their traversals
//! - [`application`]: TOML tree files and rendering
//! - [`config`]: layered settings
//! - [`cli`]: the `treewalk` command line

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
