//! Schema for the game's `modsettings.lsx` load order file

use super::partials::{id, version, xml_declaration};
use super::Schema;
use crate::constants::{ATTRIBUTES_GROUP, DECLARATION_KEY};

/// The `modsettings.lsx` schema.
///
/// Only the frame is checked: the `ModuleSettings` region and its `root`
/// node. Module entries below it are left open.
pub fn schema() -> Schema {
    let root = Schema::object()
        .required([ATTRIBUTES_GROUP, "children"])
        .property(ATTRIBUTES_GROUP, id("root"));

    let region = Schema::object()
        .required([ATTRIBUTES_GROUP, "node"])
        .property(ATTRIBUTES_GROUP, id("ModuleSettings"))
        .property("node", root);

    Schema::object()
        .required([DECLARATION_KEY, "save"])
        .property(DECLARATION_KEY, xml_declaration())
        .property(
            "save",
            Schema::object()
                .required(["version"])
                .property("version", version())
                .property("region", region),
        )
}
