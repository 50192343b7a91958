//! Data formats used by BG3 mod descriptors
//!
//! - [`version64`]: the packed 64-bit version number
//! - [`tree`]: XML <-> JSON-like document tree

pub mod tree;
pub mod version64;

pub use tree::{TreeOptions, parse_tree, read_tree, write_tree};
pub use version64::{Version64, VersionKind, version64_in_line};
