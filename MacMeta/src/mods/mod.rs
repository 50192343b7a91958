//! Mod utilities - descriptor editing, handles and packaging for BG3 mods
//!
//! This module provides tools for working with a mod workspace:
//! - Read and edit the `meta.lsx` descriptor
//! - Generate UUIDs and localization handles
//! - Look up localization text by handle
//! - Build `divine.exe` command lines for packaging

pub mod handle;
pub mod localization;
pub mod meta;
pub mod package;
pub mod workspace;

pub use handle::{from_handle, new_handle, new_uuid, to_handle};
pub use localization::LocalizationReference;
pub use meta::{
    Dependency, DependencyField, MetaLsx, MetaNode, ModuleInfo, ModuleInfoField, meta_tree_options,
};
pub use package::{Action, Divine, Game, loca_destination, package_destination};
pub use workspace::{
    find_localization_files, find_meta_lsx, mod_root_folder, mod_root_name, read_meta_lsx,
    write_meta_lsx,
};
