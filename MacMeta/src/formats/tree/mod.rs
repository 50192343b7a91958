//! Generic XML <-> JSON-like document tree
//!
//! Parses any XML document into a [`serde_json::Value`] so it can be checked
//! against a [`Schema`](crate::schema::Schema), and writes such a tree back
//! to XML.
//!
//! # Tree shape
//!
//! - The document is an object holding the root element(s) and, unless
//!   ignored, the `<?xml ... ?>` declaration under [`DECLARATION_KEY`].
//! - An element with neither attributes nor child elements becomes its text
//!   (an empty element becomes `""`).
//! - Otherwise an element becomes an object: attributes under the
//!   attributes group (or merged into the object when no group is set),
//!   child elements keyed by tag name, and text under [`TEXT_KEY`].
//! - Repeated sibling tags collapse into an array in document order.
//!
//! ```
//! use macmeta::formats::tree::{parse_tree, TreeOptions};
//!
//! let tree = parse_tree(r#"<a><b id="1"/><b id="2"/></a>"#, &TreeOptions::default())?;
//! assert_eq!(tree["a"]["b"][1]["_@_"]["id"], 2);
//! # Ok::<(), macmeta::Error>(())
//! ```
//!
//! [`DECLARATION_KEY`]: crate::constants::DECLARATION_KEY
//! [`TEXT_KEY`]: crate::constants::TEXT_KEY

mod reader;
mod writer;

pub(crate) use reader::line_column;
pub use reader::{parse_tree, read_tree};
pub use writer::write_tree;

use crate::constants::ATTRIBUTES_GROUP;

/// Predicate deciding whether an element is always collected into an array.
///
/// Called with the element's tag and its dotted path from the document root
/// (e.g. `save.region.node.children.node`).
pub type ArrayPredicate = fn(tag: &str, path: &str) -> bool;

/// Options controlling the tree shape.
#[derive(Debug, Clone, Copy)]
pub struct TreeOptions<'a> {
    /// Key grouping each element's attributes. `None` merges attributes into
    /// the element object.
    pub attributes_group: Option<&'a str>,
    /// Convert attribute values and text to booleans and numbers where the
    /// conversion is lossless.
    pub parse_values: bool,
    /// Leave the `<?xml ... ?>` declaration out of the tree.
    pub ignore_declaration: bool,
    /// Elements for which this returns `true` become arrays even when single.
    pub always_array: ArrayPredicate,
}

fn never(_tag: &str, _path: &str) -> bool {
    false
}

impl Default for TreeOptions<'_> {
    fn default() -> Self {
        Self {
            attributes_group: Some(ATTRIBUTES_GROUP),
            parse_values: true,
            ignore_declaration: false,
            always_array: never,
        }
    }
}

impl<'a> TreeOptions<'a> {
    /// Set the attributes group key.
    #[must_use]
    pub fn with_attributes_group(mut self, group: Option<&'a str>) -> Self {
        self.attributes_group = group;
        self
    }

    /// Enable or disable value conversion.
    #[must_use]
    pub fn with_parse_values(mut self, parse_values: bool) -> Self {
        self.parse_values = parse_values;
        self
    }

    /// Enable or disable dropping the XML declaration.
    #[must_use]
    pub fn with_ignore_declaration(mut self, ignore: bool) -> Self {
        self.ignore_declaration = ignore;
        self
    }

    /// Set the array predicate.
    #[must_use]
    pub fn with_always_array(mut self, predicate: ArrayPredicate) -> Self {
        self.always_array = predicate;
        self
    }
}
