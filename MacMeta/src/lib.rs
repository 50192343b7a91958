#![allow(non_snake_case)]
//! # MacMeta
//!
//! Schema diagnostics and descriptor tooling for Baldur's Gate 3 mod files.
//!
//! ## Features
//!
//! - **Version64** - Pack, unpack and bump the game's 64-bit version numbers
//! - **Schema validation** - Check XML documents (`meta.lsx`, localization
//!   XML, `modsettings.lsx`) against JSON-schema-like descriptions
//! - **Diagnostics** - Turn schema violations into positioned problems
//! - **Descriptor editing** - Read and update `meta.lsx` with exact write-back
//!
//! ## Quick Start
//!
//! ### Version numbers
//!
//! ```
//! use macmeta::formats::{Version64, VersionKind};
//!
//! let version = Version64::from_int64(36028797018963968);
//! assert_eq!(version.to_string(), "1.0.0.0");
//! assert_eq!(version.bump(VersionKind::Minor).to_string(), "1.1.0.0");
//! ```
//!
//! ### Diagnosing a document
//!
//! ```
//! use macmeta::diagnostics::{DiagnosticsEngine, TextDocument};
//!
//! let engine = DiagnosticsEngine::meta_lsx()?;
//! let doc = TextDocument::new("Mods/MyMod/meta.lsx", "xml", 1, "<save>\n");
//! let problems = engine.compute_problems(&doc);
//! assert_eq!(problems.len(), 1);
//! # Ok::<(), macmeta::Error>(())
//! ```
//!
//! ### Editing a descriptor
//!
//! ```no_run
//! use macmeta::formats::VersionKind;
//! use macmeta::mods::{find_meta_lsx, read_meta_lsx, write_meta_lsx};
//!
//! let path = find_meta_lsx("MyMod")?;
//! let mut meta = read_meta_lsx(&path)?;
//! meta.bump_version(VersionKind::Build)?;
//! write_meta_lsx(&path, &meta)?;
//! # Ok::<(), macmeta::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `macmeta` command-line binary

pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod formats;
pub mod mods;
pub mod schema;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::formats::{TreeOptions, Version64, VersionKind, parse_tree, write_tree};

    pub use crate::schema::{Schema, ValidationError, Validator, validate};

    pub use crate::diagnostics::{
        DiagnosticsEngine, PathResolver, Problem, ProblemCollection, SourcePosition,
        TextDocument, resolve_position,
    };

    // Mods module exports
    pub use crate::mods::{
        Divine, LocalizationReference, MetaLsx, ModuleInfoField, find_meta_lsx, new_handle,
        new_uuid, to_handle,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
