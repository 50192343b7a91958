//! Error types for `MacMeta`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `MacMeta` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Descriptor (meta.lsx) Errors ====================
    /// No `meta.lsx` file exists below the searched directory.
    #[error("failed to find the `meta.lsx` file under {root}")]
    MetaLsxNotFound {
        /// The directory that was searched.
        root: PathBuf,
    },

    /// A required `<node id="...">` is missing from the descriptor.
    #[error("descriptor has no `{id}` node")]
    MissingNode {
        /// The node id that was looked up.
        id: String,
    },

    /// A required `<attribute id="...">` is missing from a descriptor node.
    #[error("`{node}` node has no `{id}` attribute")]
    MissingAttribute {
        /// The node holding the attribute list.
        node: String,
        /// The attribute id that was looked up.
        id: String,
    },

    // ==================== Version / Identifier Format Errors ====================
    /// The dotted version string is malformed.
    #[error("invalid version number `{0}` (format: {{major}}.{{minor}}.{{revision}}.{{build}})")]
    InvalidVersionFormat(String),

    /// The packed Version64 value is not a decimal unsigned 64-bit integer.
    #[error("invalid Version64 value `{0}`")]
    InvalidVersion64(String),

    /// Unknown version bump kind.
    #[error("invalid version kind `{0}` (expected major, minor, revision or build)")]
    InvalidVersionKind(String),

    /// The string is not a UUID.
    #[error("invalid UUID `{0}`")]
    InvalidUuid(String),

    /// The string is not a localization handle.
    #[error("invalid localization handle `{0}`")]
    InvalidHandle(String),

    /// Unknown game identifier for the packaging tool.
    #[error("unknown game `{0}` (expected dos, dosee, dos2, dos2de or bg3)")]
    InvalidGame(String),

    // ==================== Parsing Errors ====================
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error: {0}")]
    XmlAttrError(String),

    /// The document is not well-formed XML.
    #[error("{message} (line {line}, column {column})")]
    XmlSyntax {
        /// Zero-based line of the offending input.
        line: usize,
        /// Zero-based column of the offending input.
        column: usize,
        /// Description of the problem.
        message: String,
    },

    /// A document tree that cannot be written as XML.
    #[error("cannot serialize document tree: {0}")]
    InvalidTree(String),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// UTF-8 conversion error.
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    // ==================== Schema Errors ====================
    /// The schema itself is unusable (e.g. a `pattern` that is not a regex).
    #[error("invalid schema: {message}")]
    InvalidSchema {
        /// Description of what is invalid.
        message: String,
    },

    // ==================== File System / External Tool Errors ====================
    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),

    /// The external packaging tool could not be run or reported failure.
    #[error("`{tool}` failed: {message}")]
    ToolFailed {
        /// The executable that was invoked.
        tool: String,
        /// Exit status or spawn error.
        message: String,
    },
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttrError(err.to_string())
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `MacMeta` operations.
pub type Result<T> = std::result::Result<T, Error>;
