//! Localization handle lookup table

use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::constants::{ATTRIBUTES_GROUP, TEXT_KEY};
use crate::error::Result;
use crate::formats::tree::{TreeOptions, parse_tree, read_tree};

fn tree_options() -> TreeOptions<'static> {
    TreeOptions::default()
        .with_parse_values(false)
        .with_ignore_declaration(true)
        .with_always_array(|tag, _| tag == "content")
}

/// Maps localization handles to their text.
///
/// Built from `contentList/content[@contentuid]` entries. A handle seen again
/// replaces the earlier text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizationReference {
    entries: IndexMap<String, String>,
}

impl LocalizationReference {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from one localization document.
    ///
    /// # Errors
    /// Returns an error if the document is not well-formed XML.
    pub fn from_xml(text: &str) -> Result<Self> {
        let mut reference = Self::new();
        reference.extend_from_xml(text)?;
        Ok(reference)
    }

    /// Build a table from localization files.
    ///
    /// # Errors
    /// Returns an error for the first file that cannot be read or parsed.
    pub fn from_files<I, P>(files: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut reference = Self::new();
        for file in files {
            let tree = read_tree(file.as_ref(), &tree_options())?;
            let added = reference.extend_from_tree(&tree);
            debug!("{}: {added} handles", file.as_ref().display());
        }
        Ok(reference)
    }

    /// Add every entry of a localization document. Returns how many were added.
    ///
    /// # Errors
    /// Returns an error if the document is not well-formed XML.
    pub fn extend_from_xml(&mut self, text: &str) -> Result<usize> {
        let tree = parse_tree(text, &tree_options())?;
        Ok(self.extend_from_tree(&tree))
    }

    fn extend_from_tree(&mut self, tree: &Value) -> usize {
        let Some(Value::Array(contents)) = tree.get("contentList").and_then(|list| list.get("content")) else {
            return 0;
        };

        let mut added = 0;
        for content in contents {
            let Some(handle) = content
                .get(ATTRIBUTES_GROUP)
                .and_then(|attrs| attrs.get("contentuid"))
                .and_then(Value::as_str)
            else {
                continue;
            };
            let text = content
                .get(TEXT_KEY)
                .and_then(Value::as_str)
                .unwrap_or_default();
            self.entries.insert(handle.to_string(), text.to_string());
            added += 1;
        }
        added
    }

    #[must_use]
    pub fn get(&self, handle: &str) -> Option<&str> {
        self.entries.get(handle).map(String::as_str)
    }

    pub fn insert(&mut self, handle: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.entries.insert(handle.into(), text.into())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
