//! Filesystem primitives shared by actions, stores and the primary installer.

pub mod json;
pub mod paths;
pub mod tree;

pub use json::{read_json_or_default, write_json_atomic};
pub use paths::{ensure_relative_path, join_relative};
pub use tree::{copy_path, create_symlink, remove_dir_if_empty, remove_path_if_exists};
