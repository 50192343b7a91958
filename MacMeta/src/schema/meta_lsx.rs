//! Schema for a mod's `meta.lsx` descriptor
//!
//! ```xml
//! <save>
//!   <version major="4" minor="0" revision="9" build="331" />
//!   <region id="Config">
//!     <node id="root">
//!       <children>
//!         <node id="Dependencies"> ... </node>
//!         <node id="ModuleInfo"> ... </node>
//!       </children>
//!     </node>
//!   </region>
//! </save>
//! ```

use super::partials::{id, lsx_attribute, text, version, xml_declaration};
use super::{JsonType, Schema};
use crate::constants::{ATTRIBUTES_GROUP, DECLARATION_KEY, UUID_PATTERN};

fn uuid_value() -> Schema {
    Schema::string().pattern(UUID_PATTERN)
}

/// `Version64` values past 2^53 stay strings, smaller ones parse as integers.
fn int64_value() -> Schema {
    Schema::of_types([JsonType::String, JsonType::Integer])
}

// ============================================================================
// Dependencies
// ============================================================================

fn dependency_attributes() -> Schema {
    Schema::array().tuple(vec![
        lsx_attribute("Folder", "LSString", text()),
        lsx_attribute("MD5", "LSString", text()),
        lsx_attribute("Name", "LSString", text()),
        lsx_attribute("UUID", "FixedString", uuid_value()),
        lsx_attribute("Version64", "int64", int64_value()),
    ])
}

fn dependencies_node() -> Schema {
    let module_short_desc = Schema::object()
        .required([ATTRIBUTES_GROUP, "attribute"])
        .closed()
        .property(ATTRIBUTES_GROUP, id("ModuleShortDesc"))
        .property("attribute", dependency_attributes());

    Schema::object()
        .required([ATTRIBUTES_GROUP])
        .property(ATTRIBUTES_GROUP, id("Dependencies"))
        .property(
            "children",
            Schema::object()
                .required(["node"])
                .closed()
                .property("node", Schema::array().items(module_short_desc)),
        )
}

// ============================================================================
// ModuleInfo
// ============================================================================

fn module_info_attributes() -> Schema {
    let known = vec![
        lsx_attribute("Author", "LSWString", text()),
        lsx_attribute("CharacterCreationLevelName", "FixedString", text()),
        lsx_attribute("Description", "LSWString", text()),
        lsx_attribute("Folder", "LSWString", text()),
        lsx_attribute("GMTemplate", "FixedString", text()),
        lsx_attribute("LobbyLevelName", "FixedString", text()),
        lsx_attribute("MD5", "LSString", text()),
        lsx_attribute("MainMenuBackgroundVideo", "FixedString", text()),
        lsx_attribute("MenuLevelName", "FixedString", text()),
        lsx_attribute("Name", "FixedString", text()),
        lsx_attribute("NumPlayers", "uint8", Schema::number()),
        lsx_attribute("PhotoBooth", "FixedString", text()),
        lsx_attribute("StartupLevelName", "FixedString", text()),
        lsx_attribute("Tags", "LSWString", text()),
        lsx_attribute("Type", "FixedString", text()),
        lsx_attribute("UUID", "FixedString", uuid_value()),
        lsx_attribute("Version64", "int64", int64_value()),
    ];

    Schema::array()
        .unique_items()
        .items(Schema::any().any_of(known))
}

fn publish_version_node() -> Schema {
    Schema::object()
        .required([ATTRIBUTES_GROUP, "attribute"])
        .closed()
        .property(ATTRIBUTES_GROUP, id("PublishVersion"))
        .property(
            "attribute",
            Schema::array().tuple(vec![lsx_attribute("Version64", "int64", int64_value())]),
        )
}

fn scripts_node() -> Schema {
    Schema::object()
        .required([ATTRIBUTES_GROUP])
        .closed()
        .property(ATTRIBUTES_GROUP, id("Scripts"))
}

fn target_modes_node() -> Schema {
    let target = Schema::object()
        .required([ATTRIBUTES_GROUP, "attribute"])
        .closed()
        .property(ATTRIBUTES_GROUP, id("Target"))
        .property(
            "attribute",
            Schema::array().tuple(vec![lsx_attribute(
                "Object",
                "FixedString",
                Schema::constant_str("Story"),
            )]),
        );

    Schema::object()
        .required([ATTRIBUTES_GROUP, "children"])
        .closed()
        .property(ATTRIBUTES_GROUP, id("TargetModes"))
        .property(
            "children",
            Schema::object()
                .required(["node"])
                .closed()
                .property("node", Schema::array().items(target)),
        )
}

fn module_info_node() -> Schema {
    Schema::object()
        .required([ATTRIBUTES_GROUP, "attribute", "children"])
        .closed()
        .property(ATTRIBUTES_GROUP, id("ModuleInfo"))
        .property("attribute", module_info_attributes())
        .property(
            "children",
            Schema::object().required(["node"]).closed().property(
                "node",
                Schema::array().tuple(vec![
                    publish_version_node(),
                    scripts_node(),
                    target_modes_node(),
                ]),
            ),
        )
}

// ============================================================================
// Document
// ============================================================================

/// The `meta.lsx` schema.
///
/// Expects the tree produced with the attributes group, parsed values and
/// `children.node` / `node.attribute` forced into arrays (see
/// [`meta_tree_options`](crate::mods::meta::meta_tree_options)).
pub fn schema() -> Schema {
    let root_node = Schema::object()
        .required([ATTRIBUTES_GROUP, "children"])
        .closed()
        .property(ATTRIBUTES_GROUP, id("root"))
        .property(
            "children",
            Schema::object().required(["node"]).closed().property(
                "node",
                Schema::array().tuple(vec![dependencies_node(), module_info_node()]),
            ),
        );

    let region = Schema::object()
        .required([ATTRIBUTES_GROUP, "node"])
        .closed()
        .property(ATTRIBUTES_GROUP, id("Config"))
        .property("node", root_node);

    Schema::object()
        .required([DECLARATION_KEY, "save"])
        .closed()
        .property(DECLARATION_KEY, xml_declaration())
        .property(
            "save",
            Schema::object()
                .required(["version", "region"])
                .closed()
                .property("version", version())
                .property("region", region),
        )
}
