//! Schema diagnostics for XML documents
//!
//! A [`DiagnosticsEngine`] pairs a [`Schema`] with a predicate choosing the
//! documents it applies to. [`DiagnosticsEngine::compute_problems`] runs a
//! full pass over a document:
//!
//! 1. well-formedness check (a malformed document yields exactly one
//!    problem and nothing else),
//! 2. parse into a document tree,
//! 3. schema validation,
//! 4. position resolution and message formatting for every violation.
//!
//! Nothing is cached between passes except the compiled schema.

mod collection;
mod resolver;
mod syntax;

pub use collection::ProblemCollection;
pub use resolver::{PathResolver, SourcePosition, resolve_position};
pub use syntax::check_well_formed;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::constants::{ATTRIBUTES_GROUP, DIAGNOSTICS_SOURCE, TEXT_KEY};
use crate::error::{Error, Result};
use crate::formats::tree::{TreeOptions, parse_tree};
use crate::mods::meta::meta_tree_options;
use crate::schema::{ErrorKind, PathToken, Schema, ValidationError, Validator};

/// Code attached to well-formedness problems.
pub const INVALID_XML_CODE: &str = "InvalidXml";

// ============================================================================
// Documents and problems
// ============================================================================

/// An open document: identity, language, edit version and full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    pub uri: String,
    pub language_id: String,
    /// Increases with every edit.
    pub version: i32,
    pub text: String,
}

impl TextDocument {
    pub fn new(
        uri: impl Into<String>,
        language_id: impl Into<String>,
        version: i32,
        text: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            language_id: language_id.into(),
            version,
            text: text.into(),
        }
    }

    /// Load a document from disk. The language is derived from the extension.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read as UTF-8.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Ok(Self::new(
            path.to_string_lossy(),
            language_for(path),
            0,
            text,
        ))
    }

    /// The document path (the URI as a filesystem path).
    #[must_use]
    pub fn path(&self) -> PathBuf {
        PathBuf::from(self.uri.strip_prefix("file://").unwrap_or(&self.uri))
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        self.uri
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.uri)
    }
}

/// Language id for a path: LSX is XML with another extension.
fn language_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "xml" | "lsx" => "xml",
        "json" | "lsj" => "json",
        _ => "plaintext",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Information => "info",
            Self::Hint => "hint",
        };
        f.write_str(name)
    }
}

/// Zero-based line and character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    #[must_use]
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[must_use]
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// From `start` to the end of line `line` of `text`.
    fn to_line_end(text: &str, line: usize, start: usize) -> Self {
        let end = text.lines().nth(line).map_or(start, |l| l.chars().count());
        Self::new(Position::new(line, start), Position::new(line, end.max(start)))
    }

    /// Line `line` of `text` from its first non-whitespace character to its end.
    fn whole_line(text: &str, line: usize) -> Self {
        let start = text.lines().nth(line).map_or(0, |l| {
            l.chars().take_while(|c| c.is_whitespace()).count()
        });
        Self::to_line_end(text, line, start)
    }
}

/// A positioned diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub severity: Severity,
    /// Name of the engine that produced the problem.
    pub source: String,
    pub code: Option<String>,
    pub message: String,
    pub range: Range,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.range.start.line + 1,
            self.range.start.character + 1,
            self.severity,
            self.message
        )
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Chooses the documents an engine checks.
pub type Applicability = fn(&TextDocument) -> bool;

/// Validates documents of one kind against one schema.
#[derive(Debug, Clone)]
pub struct DiagnosticsEngine {
    source: String,
    validator: Validator,
    is_applicable: Applicability,
    tree_options: TreeOptions<'static>,
}

impl DiagnosticsEngine {
    /// Build an engine for a custom schema.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSchema`] if the schema has an invalid pattern.
    pub fn new(
        source: impl Into<String>,
        schema: Schema,
        is_applicable: Applicability,
        tree_options: TreeOptions<'static>,
    ) -> Result<Self> {
        Ok(Self {
            source: source.into(),
            validator: Validator::new(schema)?,
            is_applicable,
            tree_options,
        })
    }

    /// Engine for `meta.lsx` descriptors.
    ///
    /// # Errors
    /// Returns an error if the built-in schema fails to compile.
    pub fn meta_lsx() -> Result<Self> {
        Self::new(
            DIAGNOSTICS_SOURCE,
            crate::schema::meta_lsx::schema(),
            |doc| doc.language_id == "xml" && doc.file_name().ends_with("meta.lsx"),
            meta_tree_options().with_parse_values(true).with_ignore_declaration(false),
        )
    }

    /// Engine for localization XML (any `.xml` below a `Localization` folder).
    ///
    /// # Errors
    /// Returns an error if the built-in schema fails to compile.
    pub fn localization_xml() -> Result<Self> {
        Self::new(
            DIAGNOSTICS_SOURCE,
            crate::schema::localization::schema(),
            |doc| {
                doc.language_id == "xml"
                    && doc.file_name().to_lowercase().ends_with(".xml")
                    && doc
                        .path()
                        .components()
                        .any(|c| c.as_os_str() == "Localization")
            },
            TreeOptions::default().with_always_array(|tag, _| tag == "content"),
        )
    }

    /// Engine for the game's `modsettings.lsx`.
    ///
    /// # Errors
    /// Returns an error if the built-in schema fails to compile.
    pub fn modsettings_lsx() -> Result<Self> {
        Self::new(
            DIAGNOSTICS_SOURCE,
            crate::schema::modsettings::schema(),
            |doc| doc.language_id == "xml" && doc.file_name().ends_with("modsettings.lsx"),
            TreeOptions::default().with_always_array(|tag, _| tag == "children"),
        )
    }

    /// All built-in engines.
    ///
    /// # Errors
    /// Returns an error if a built-in schema fails to compile.
    pub fn builtin() -> Result<Vec<Self>> {
        Ok(vec![
            Self::meta_lsx()?,
            Self::localization_xml()?,
            Self::modsettings_lsx()?,
        ])
    }

    /// Replace the name reported as each problem's source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        self.validator.schema()
    }

    #[must_use]
    pub fn is_applicable(&self, doc: &TextDocument) -> bool {
        (self.is_applicable)(doc)
    }

    /// Every problem in `doc`, in validation order.
    #[must_use]
    pub fn compute_problems(&self, doc: &TextDocument) -> Vec<Problem> {
        if let Err(err) = check_well_formed(&doc.text) {
            return vec![self.syntax_problem(doc, &err)];
        }

        let tree = match parse_tree(&doc.text, &self.tree_options) {
            Ok(tree) => tree,
            Err(err) => return vec![self.syntax_problem(doc, &err)],
        };

        let errors = self.validator.validate(&tree);
        debug!("{}: {} schema violations", doc.uri, errors.len());

        let group = self.tree_options.attributes_group.unwrap_or(ATTRIBUTES_GROUP);
        let resolver = PathResolver::new(&doc.text, group);

        errors
            .iter()
            .map(|error| {
                let position = resolver.resolve(&error.path);
                let range = match (position.col_start, position.col_end) {
                    (Some(start), Some(end)) => Range::new(
                        Position::new(position.line, start),
                        Position::new(position.line, end),
                    ),
                    _ => Range::whole_line(&doc.text, position.line),
                };
                Problem {
                    severity: Severity::Error,
                    source: self.source.clone(),
                    code: Some(error.kind.to_string()),
                    message: format_message(error, group),
                    range,
                }
            })
            .collect()
    }

    fn syntax_problem(&self, doc: &TextDocument, err: &Error) -> Problem {
        let (line, column, message) = match err {
            Error::XmlSyntax {
                line,
                column,
                message,
            } => (*line, *column, message.clone()),
            other => (0, 0, other.to_string()),
        };
        Problem {
            severity: Severity::Error,
            source: self.source.clone(),
            code: Some(INVALID_XML_CODE.to_string()),
            message,
            range: Range::to_line_end(&doc.text, line, column),
        }
    }
}

/// User-facing message for a schema violation.
#[must_use]
pub fn format_message(error: &ValidationError, attributes_group: &str) -> String {
    match error.kind {
        ErrorKind::Required => format!(
            "Missing required element/attribute: `{}`",
            error.argument.as_deref().unwrap_or_default()
        ),
        ErrorKind::AdditionalProperties => format!(
            "Unknown element/attribute: `{}`",
            error.argument.as_deref().unwrap_or_default()
        ),
        ErrorKind::Type => {
            let name = error
                .path
                .iter()
                .rev()
                .filter_map(PathToken::as_key)
                .find(|key| *key != attributes_group && *key != TEXT_KEY)
                .unwrap_or("document");
            format!("`{name}` value is not of valid type")
        }
        _ => error.message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::JsonType;
    use pretty_assertions::assert_eq;

    fn doc(name: &str, text: &str) -> TextDocument {
        TextDocument::new(format!("file:///mods/{name}"), "xml", 1, text)
    }

    fn engine() -> DiagnosticsEngine {
        let schema = Schema::object().required(["root"]).property(
            "root",
            Schema::object()
                .required(["_@_", "item"])
                .closed()
                .property("_@_", Schema::object().property("id", Schema::string()))
                .property(
                    "item",
                    Schema::array().items(
                        Schema::object().property(
                            "_@_",
                            Schema::object()
                                .closed()
                                .property("n", Schema::number().minimum(0.0)),
                        ),
                    ),
                ),
        );
        DiagnosticsEngine::new(
            "TEST",
            schema,
            |d| d.uri.ends_with(".xml"),
            TreeOptions::default().with_always_array(|tag, _| tag == "item"),
        )
        .unwrap()
    }

    #[test]
    fn test_malformed_document_yields_single_problem() {
        let problems = engine().compute_problems(&doc("a.xml", "<root id=\"x\">\n  <item n=\"1\">\n</root>"));
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].code.as_deref(), Some(INVALID_XML_CODE));
        assert_eq!(problems[0].range.start.line, 2);
    }

    #[test]
    fn test_schema_problems_are_positioned() {
        let text = "<root id=\"x\">\n  <item n=\"1\" />\n  <item n=\"-2\" bad=\"y\" />\n  <extra />\n</root>";
        let problems = engine().compute_problems(&doc("a.xml", text));

        let summary: Vec<(usize, &str)> = problems
            .iter()
            .map(|p| (p.range.start.line, p.message.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (2, "must be greater than or equal to 0"),
                (2, "Unknown element/attribute: `bad`"),
                (3, "Unknown element/attribute: `extra`"),
            ]
        );

        // attribute-level problem carries columns of `bad="y"`
        assert_eq!(problems[1].range.start.character, 15);
        assert_eq!(problems[1].range.end.character, 22);
        // element-level problem spans the trimmed line
        assert_eq!(problems[2].range.start.character, 2);
        assert_eq!(problems[2].range.end.character, 11);
        assert!(problems.iter().all(|p| p.source == "TEST"));
    }

    #[test]
    fn test_required_and_type_messages() {
        let problems = engine().compute_problems(&doc("a.xml", "<root>\n  <item>text</item>\n</root>"));
        let messages: Vec<&str> = problems.iter().map(|p| p.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Missing required element/attribute: `_@_`",
                "`item` value is not of valid type",
            ]
        );
    }

    #[test]
    fn test_applicability() {
        let meta = DiagnosticsEngine::meta_lsx().unwrap();
        assert!(meta.is_applicable(&doc("Mods/MyMod/meta.lsx", "")));
        assert!(!meta.is_applicable(&TextDocument::new("meta.lsx", "json", 1, "")));

        let loca = DiagnosticsEngine::localization_xml().unwrap();
        assert!(loca.is_applicable(&doc("Localization/English/english.xml", "")));
        assert!(!loca.is_applicable(&doc("Public/english.xml", "")));

        let settings = DiagnosticsEngine::modsettings_lsx().unwrap();
        assert!(settings.is_applicable(&doc("PlayerProfiles/Public/modsettings.lsx", "")));
    }

    #[test]
    fn test_type_message_skips_group_tokens() {
        let error = ValidationError {
            path: vec!["save".into(), "version".into(), "_@_".into()],
            kind: ErrorKind::Type,
            message: String::new(),
            argument: None,
        };
        assert_eq!(format_message(&error, "_@_"), "`version` value is not of valid type");
    }

    #[test]
    fn test_custom_source() {
        let engine = DiagnosticsEngine::new(
            "X",
            Schema::of_type(JsonType::Object),
            |_| true,
            TreeOptions::default(),
        )
        .unwrap()
        .with_source("Y");
        assert_eq!(engine.source(), "Y");
    }
}
