//! `meta.lsx` descriptor model
//!
//! The descriptor is kept as a document tree so that edits write back
//! exactly what was read, apart from the changed values. Typed views over
//! `ModuleInfo` and `Dependencies` are built once at parse time and kept in
//! sync by [`MetaLsx::set`].

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::constants::ATTRIBUTES_GROUP;
use crate::error::{Error, Result};
use crate::formats::tree::{TreeOptions, parse_tree, write_tree};
use crate::formats::version64::{Version64, VersionKind};

/// Tree options for descriptor files.
///
/// Values stay text, and single `children.node` / `node.attribute` entries
/// are still arrays so every node list has the same shape.
#[must_use]
pub fn meta_tree_options() -> TreeOptions<'static> {
    fn node_lists(_tag: &str, path: &str) -> bool {
        path.ends_with("children.node") || path.ends_with("node.attribute")
    }

    TreeOptions::default()
        .with_parse_values(false)
        .with_always_array(node_lists)
}

// ============================================================================
// Attribute ids
// ============================================================================

macro_rules! attribute_ids {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $id:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub enum $name {
            $(
                #[serde(rename = $id)]
                $variant,
            )+
        }

        impl $name {
            /// Every known id, in schema order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The `id` attribute value.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $id,)+
                }
            }

            /// Look up a known id (exact match).
            #[must_use]
            pub fn from_id(id: &str) -> Option<Self> {
                match id {
                    $($id => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|field| field.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| format!("unknown {} attribute `{s}`", stringify!($name)))
            }
        }
    };
}

attribute_ids! {
    /// Attribute ids of the `ModuleInfo` node.
    ModuleInfoField {
        Author => "Author",
        CharacterCreationLevelName => "CharacterCreationLevelName",
        Description => "Description",
        Folder => "Folder",
        GMTemplate => "GMTemplate",
        LobbyLevelName => "LobbyLevelName",
        MD5 => "MD5",
        MainMenuBackgroundVideo => "MainMenuBackgroundVideo",
        MenuLevelName => "MenuLevelName",
        Name => "Name",
        NumPlayers => "NumPlayers",
        PhotoBooth => "PhotoBooth",
        StartupLevelName => "StartupLevelName",
        Tags => "Tags",
        Type => "Type",
        UUID => "UUID",
        Version64 => "Version64",
    }
}

attribute_ids! {
    /// Attribute ids of a `ModuleShortDesc` dependency node.
    DependencyField {
        Folder => "Folder",
        MD5 => "MD5",
        Name => "Name",
        UUID => "UUID",
        Version64 => "Version64",
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// Kind of a descriptor `<node>`, decoded from its `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaNode {
    Dependencies,
    ModuleInfo,
    PublishVersion,
    Scripts,
    TargetModes,
    Other(String),
}

impl MetaNode {
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        match id {
            "Dependencies" => Self::Dependencies,
            "ModuleInfo" => Self::ModuleInfo,
            "PublishVersion" => Self::PublishVersion,
            "Scripts" => Self::Scripts,
            "TargetModes" => Self::TargetModes,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Dependencies => "Dependencies",
            Self::ModuleInfo => "ModuleInfo",
            Self::PublishVersion => "PublishVersion",
            Self::Scripts => "Scripts",
            Self::TargetModes => "TargetModes",
            Self::Other(id) => id,
        }
    }
}

impl fmt::Display for MetaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// `ModuleInfo` attribute values by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ModuleInfo {
    pub attributes: IndexMap<ModuleInfoField, String>,
}

impl ModuleInfo {
    #[must_use]
    pub fn get(&self, field: ModuleInfoField) -> Option<&str> {
        self.attributes.get(&field).map(String::as_str)
    }
}

/// One `ModuleShortDesc` entry of the `Dependencies` node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Dependency {
    pub attributes: IndexMap<DependencyField, String>,
}

impl Dependency {
    #[must_use]
    pub fn get(&self, field: DependencyField) -> Option<&str> {
        self.attributes.get(&field).map(String::as_str)
    }
}

// ============================================================================
// Descriptor
// ============================================================================

/// A parsed `meta.lsx`.
#[derive(Debug, Clone)]
pub struct MetaLsx {
    tree: Value,
    module_info: ModuleInfo,
    dependencies: Vec<Dependency>,
    crlf: bool,
    trailing_newline: bool,
}

impl MetaLsx {
    /// Parse descriptor text.
    ///
    /// # Errors
    /// Returns a parse error for malformed XML, or [`Error::MissingNode`]
    /// if the descriptor has no `ModuleInfo` node.
    pub fn parse(text: &str) -> Result<Self> {
        let tree = parse_tree(text, &meta_tree_options())?;

        let module_info = ModuleInfo {
            attributes: typed_attributes(find_node(&tree, &MetaNode::ModuleInfo)?, ModuleInfoField::from_id),
        };

        let dependencies = match find_node(&tree, &MetaNode::Dependencies) {
            Ok(node) => child_nodes(node)
                .iter()
                .map(|desc| Dependency {
                    attributes: typed_attributes(desc, DependencyField::from_id),
                })
                .collect(),
            Err(_) => Vec::new(),
        };
        debug!(
            "parsed meta.lsx: {} module attributes, {} dependencies",
            module_info.attributes.len(),
            dependencies.len()
        );

        Ok(Self {
            tree,
            module_info,
            dependencies,
            crlf: text.contains("\r\n"),
            trailing_newline: text.ends_with('\n'),
        })
    }

    #[must_use]
    pub fn module_info(&self) -> &ModuleInfo {
        &self.module_info
    }

    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// The underlying document tree.
    #[must_use]
    pub fn tree(&self) -> &Value {
        &self.tree
    }

    /// Kinds of the nodes below the descriptor root, in document order.
    #[must_use]
    pub fn nodes(&self) -> Vec<MetaNode> {
        root_children(&self.tree)
            .map(|nodes| {
                nodes
                    .iter()
                    .filter_map(node_id)
                    .map(MetaNode::from_id)
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, field: ModuleInfoField) -> Option<&str> {
        self.module_info.get(field)
    }

    /// Overwrite a `ModuleInfo` attribute value.
    ///
    /// # Errors
    /// Returns [`Error::MissingAttribute`] if the descriptor has no such
    /// attribute, or [`Error::MissingNode`] without a `ModuleInfo` node.
    pub fn set(&mut self, field: ModuleInfoField, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        let node = find_node_mut(&mut self.tree, &MetaNode::ModuleInfo)?;

        let attribute = node
            .get_mut("attribute")
            .map(as_mut_slice)
            .into_iter()
            .flatten()
            .filter_map(|attr| attr.get_mut(ATTRIBUTES_GROUP))
            .find(|attrs| attrs.get("id").and_then(Value::as_str) == Some(field.as_str()))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| Error::MissingAttribute {
                node: MetaNode::ModuleInfo.to_string(),
                id: field.to_string(),
            })?;

        attribute.insert("value".to_string(), Value::String(value.clone()));
        self.module_info.attributes.insert(field, value);
        Ok(())
    }

    /// The module's packed version.
    ///
    /// # Errors
    /// Returns [`Error::MissingAttribute`] without a `Version64` attribute,
    /// or [`Error::InvalidVersion64`] if it is not a packed version.
    pub fn version(&self) -> Result<Version64> {
        let raw = self.require(ModuleInfoField::Version64)?;
        Version64::parse_int64(raw)
    }

    /// Bump the module version and return the new value.
    ///
    /// # Errors
    /// See [`MetaLsx::version`].
    pub fn bump_version(&mut self, kind: VersionKind) -> Result<Version64> {
        let current = self.version()?;
        let bumped = current.bump(kind);
        self.set(ModuleInfoField::Version64, bumped.to_int64().to_string())?;
        info!("bumped {kind} version {current} -> {bumped}");
        Ok(bumped)
    }

    /// The module UUID.
    ///
    /// # Errors
    /// Returns [`Error::MissingAttribute`] without a `UUID` attribute.
    pub fn uuid(&self) -> Result<&str> {
        self.require(ModuleInfoField::UUID)
    }

    /// Serialize back to LSX, keeping the source's line endings.
    ///
    /// # Errors
    /// Returns an error if the tree cannot be written.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = write_tree(&self.tree, &meta_tree_options())?;
        if self.trailing_newline {
            xml.push('\n');
        }
        if self.crlf {
            xml = xml.replace('\n', "\r\n");
        }
        Ok(xml)
    }

    fn require(&self, field: ModuleInfoField) -> Result<&str> {
        self.get(field).ok_or_else(|| Error::MissingAttribute {
            node: MetaNode::ModuleInfo.to_string(),
            id: field.to_string(),
        })
    }
}

impl FromStr for MetaLsx {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// ============================================================================
// Tree navigation
// ============================================================================

fn as_slice(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}

fn as_mut_slice(value: &mut Value) -> &mut [Value] {
    match value {
        Value::Array(items) => items,
        other => std::slice::from_mut(other),
    }
}

fn node_id(node: &Value) -> Option<&str> {
    node.get(ATTRIBUTES_GROUP)?.get("id")?.as_str()
}

fn has_id(node: &Value, id: &str) -> bool {
    node_id(node) == Some(id)
}

/// `children.node` entries of a node (empty when it has none).
fn child_nodes(node: &Value) -> &[Value] {
    node.get("children")
        .and_then(|children| children.get("node"))
        .map(as_slice)
        .unwrap_or_default()
}

fn root_node(tree: &Value) -> Option<&Value> {
    let regions = as_slice(tree.get("save")?.get("region")?);
    let region = regions
        .iter()
        .find(|region| has_id(region, "Config"))
        .or_else(|| regions.first())?;
    as_slice(region.get("node")?)
        .iter()
        .find(|node| has_id(node, "root"))
}

fn root_children(tree: &Value) -> Option<&[Value]> {
    root_node(tree).map(child_nodes)
}

fn find_node<'t>(tree: &'t Value, kind: &MetaNode) -> Result<&'t Value> {
    root_children(tree)
        .and_then(|nodes| nodes.iter().find(|node| has_id(node, kind.id())))
        .ok_or_else(|| Error::MissingNode {
            id: kind.to_string(),
        })
}

fn find_node_mut<'t>(tree: &'t mut Value, kind: &MetaNode) -> Result<&'t mut Value> {
    let missing = || Error::MissingNode {
        id: kind.to_string(),
    };

    let regions = as_mut_slice(
        tree.get_mut("save")
            .and_then(|save| save.get_mut("region"))
            .ok_or_else(missing)?,
    );
    let index = regions
        .iter()
        .position(|region| has_id(region, "Config"))
        .unwrap_or(0);
    let root = regions
        .get_mut(index)
        .and_then(|region| region.get_mut("node"))
        .map(as_mut_slice)
        .and_then(|nodes| nodes.iter_mut().find(|node| has_id(node, "root")))
        .ok_or_else(missing)?;

    root.get_mut("children")
        .and_then(|children| children.get_mut("node"))
        .map(as_mut_slice)
        .and_then(|nodes| nodes.iter_mut().find(|node| has_id(node, kind.id())))
        .ok_or_else(missing)
}

/// Known `id -> value` pairs of a node's attribute list.
fn typed_attributes<F: Copy + std::hash::Hash + Eq>(
    node: &Value,
    lookup: fn(&str) -> Option<F>,
) -> IndexMap<F, String> {
    let node_name = node_id(node).unwrap_or("?");
    let mut attributes = IndexMap::new();

    let entries = node.get("attribute").map(as_slice).unwrap_or_default();
    for entry in entries {
        let Some(attrs) = entry.get(ATTRIBUTES_GROUP) else {
            continue;
        };
        let Some(id) = attrs.get("id").and_then(Value::as_str) else {
            continue;
        };
        let Some(field) = lookup(id) else {
            warn!("ignoring unknown `{node_name}` attribute `{id}`");
            continue;
        };
        let value = attrs
            .get("value")
            .and_then(Value::as_str)
            .unwrap_or_default();
        attributes.insert(field, value.to_string());
    }

    attributes
}
