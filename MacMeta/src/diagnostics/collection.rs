//! Per-document problem store

use indexmap::IndexMap;
use tracing::debug;

use super::{DiagnosticsEngine, Problem, TextDocument};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Entry {
    version: i32,
    problems: Vec<Problem>,
}

/// Latest problems of every open document, keyed by URI.
///
/// A publish for a version older than the stored one is discarded, so a slow
/// pass over an outdated snapshot never overwrites newer results.
#[derive(Debug, Default)]
pub struct ProblemCollection {
    entries: IndexMap<String, Entry>,
}

impl ProblemCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute `doc` with every applicable engine and publish the result.
    ///
    /// Documents no engine applies to are left untouched. Returns whether the
    /// stored problems changed.
    pub fn update(&mut self, engines: &[DiagnosticsEngine], doc: &TextDocument) -> bool {
        let mut applicable = engines.iter().filter(|e| e.is_applicable(doc)).peekable();
        if applicable.peek().is_none() {
            return false;
        }
        let problems = applicable.flat_map(|e| e.compute_problems(doc)).collect();
        self.publish(&doc.uri, doc.version, problems)
    }

    /// Store `problems` for `uri` unless a newer version is already stored.
    pub fn publish(&mut self, uri: &str, version: i32, problems: Vec<Problem>) -> bool {
        if let Some(entry) = self.entries.get(uri) {
            if entry.version > version {
                debug!("discarding stale problems for {uri} (v{version} < v{})", entry.version);
                return false;
            }
        }
        self.entries
            .insert(uri.to_string(), Entry { version, problems });
        true
    }

    /// Forget a closed document.
    pub fn close(&mut self, uri: &str) -> Option<Vec<Problem>> {
        self.entries.shift_remove(uri).map(|entry| entry.problems)
    }

    #[must_use]
    pub fn get(&self, uri: &str) -> Option<&[Problem]> {
        self.entries.get(uri).map(|entry| entry.problems.as_slice())
    }

    /// Stored version of `uri`.
    #[must_use]
    pub fn version(&self, uri: &str) -> Option<i32> {
        self.entries.get(uri).map(|entry| entry.version)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Problem])> {
        self.entries
            .iter()
            .map(|(uri, entry)| (uri.as_str(), entry.problems.as_slice()))
    }

    /// Number of tracked documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of problems across all documents.
    #[must_use]
    pub fn problem_count(&self) -> usize {
        self.entries.values().map(|entry| entry.problems.len()).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Range, Severity};

    fn problem(message: &str) -> Problem {
        Problem {
            severity: Severity::Error,
            source: "BG3XML".to_string(),
            code: None,
            message: message.to_string(),
            range: Range::default(),
        }
    }

    #[test]
    fn test_stale_publish_is_discarded() {
        let mut collection = ProblemCollection::new();
        assert!(collection.publish("a", 2, vec![problem("new")]));
        assert!(!collection.publish("a", 1, vec![problem("old")]));
        assert_eq!(collection.get("a").unwrap()[0].message, "new");
        assert_eq!(collection.version("a"), Some(2));

        assert!(collection.publish("a", 2, Vec::new()));
        assert_eq!(collection.problem_count(), 0);
    }

    #[test]
    fn test_close_removes_document() {
        let mut collection = ProblemCollection::new();
        collection.publish("a", 1, vec![problem("x")]);
        collection.publish("b", 1, Vec::new());
        assert_eq!(collection.len(), 2);

        assert_eq!(collection.close("a").map(|p| p.len()), Some(1));
        assert_eq!(collection.iter().map(|(uri, _)| uri).collect::<Vec<_>>(), vec!["b"]);
        collection.clear();
        assert!(collection.is_empty());
    }

    #[test]
    fn test_update_skips_unrelated_documents() {
        let engines = DiagnosticsEngine::builtin().unwrap();
        let mut collection = ProblemCollection::new();
        let doc = TextDocument::new("notes.txt", "plaintext", 1, "<<<");
        assert!(!collection.update(&engines, &doc));
        assert!(collection.is_empty());

        let doc = TextDocument::new("Mods/A/meta.lsx", "xml", 1, "<save>");
        assert!(collection.update(&engines, &doc));
        assert_eq!(collection.get("Mods/A/meta.lsx").map(<[Problem]>::len), Some(1));
    }
}
