//! Reusable schema pieces for LSX documents

use serde_json::json;

use super::{JsonType, Schema};
use crate::constants::ATTRIBUTES_GROUP;

/// An element whose XML attributes are exactly `fields`.
///
/// ```xml
/// <attribute id="Folder" type="LSString" value="MyMod" />
/// ```
pub fn attribute<'a, I>(fields: I) -> Schema
where
    I: IntoIterator<Item = (&'a str, Schema)>,
{
    let mut attributes = Schema::object().closed();
    for (name, schema) in fields {
        attributes = attributes.required([name]).property(name, schema);
    }

    Schema::object()
        .required([ATTRIBUTES_GROUP])
        .closed()
        .property(ATTRIBUTES_GROUP, attributes)
}

/// An LSX `<attribute id=".." type=".." value=".."/>` with fixed `id` and `type`.
pub fn lsx_attribute(id: &str, type_name: &str, value: Schema) -> Schema {
    attribute([
        ("id", Schema::constant_str(id)),
        ("type", Schema::constant_str(type_name)),
        ("value", value),
    ])
}

/// An attributes group holding only `id="<name>"`.
pub fn id(name: &str) -> Schema {
    Schema::object()
        .required(["id"])
        .closed()
        .property("id", Schema::constant_str(name))
}

/// The `<?xml version="1.0" encoding="utf-8"?>` declaration.
pub fn xml_declaration() -> Schema {
    Schema::object().required([ATTRIBUTES_GROUP]).closed().property(
        ATTRIBUTES_GROUP,
        Schema::object()
            .required(["version", "encoding"])
            .closed()
            .property("version", Schema::number().minimum(1.0))
            .property(
                "encoding",
                Schema::string().one_of_values(vec![json!("utf-8"), json!("UTF-8")]),
            ),
    )
}

/// The LSX `<version major=".." minor=".." revision=".." build=".."/>` element.
pub fn version() -> Schema {
    let mut attributes = Schema::object().closed();
    for field in ["major", "minor", "revision", "build"] {
        attributes = attributes
            .required([field])
            .property(field, Schema::number().minimum(0.0));
    }

    Schema::object()
        .required([ATTRIBUTES_GROUP])
        .closed()
        .property(ATTRIBUTES_GROUP, attributes)
}

/// Free text: values that happen to look numeric are parsed as numbers.
pub fn text() -> Schema {
    Schema::of_types([JsonType::String, JsonType::Number, JsonType::Boolean])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ErrorKind, PathToken, validate};
    use serde_json::json;

    #[test]
    fn test_attribute_rejects_extra_xml_attribute() {
        let schema = lsx_attribute("Name", "LSString", Schema::string());
        let node = json!({ "_@_": { "id": "Name", "type": "LSString", "value": "x", "handle": "h" } });

        let errors = validate(&node, &schema).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::AdditionalProperties);
        assert_eq!(
            errors[0].path,
            vec![PathToken::from("_@_"), PathToken::from("handle")]
        );
    }

    #[test]
    fn test_attribute_requires_all_fields() {
        let schema = lsx_attribute("Name", "LSString", Schema::string());
        let errors = validate(&json!({ "_@_": { "id": "Name", "type": "LSString" } }), &schema).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].argument.as_deref(), Some("value"));
    }

    #[test]
    fn test_declaration_and_version() {
        let decl = json!({ "_@_": { "version": 1.0, "encoding": "utf-8" } });
        assert!(validate(&decl, &xml_declaration()).unwrap().is_empty());

        let bad = json!({ "_@_": { "version": 1.0, "encoding": "ascii" } });
        assert_eq!(validate(&bad, &xml_declaration()).unwrap()[0].kind, ErrorKind::Enum);

        let version = json!({ "_@_": { "major": 4, "minor": 0, "revision": -1, "build": 0 } });
        let errors = validate(&version, &super::version()).unwrap();
        assert_eq!(errors[0].kind, ErrorKind::Minimum);
    }
}
