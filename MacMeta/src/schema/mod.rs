//! Declarative document schemas
//!
//! A [`Schema`] is a small JSON-Schema-like description of a document tree
//! (see [`crate::formats::tree`]). Schemas are plain data: they can be built
//! in Rust through the builder methods below or deserialized from JSON using
//! the usual keyword names (`type`, `required`, `properties`,
//! `additionalProperties`, `items`, `const`, `enum`, `pattern`, `minimum`,
//! `anyOf`, `uniqueItems`).
//!
//! Built-in schemas for BG3 files live in [`meta_lsx`], [`localization`] and
//! [`modsettings`], composed from the pieces in [`partials`].

pub mod localization;
pub mod meta_lsx;
pub mod modsettings;
pub mod partials;
mod validator;

pub use validator::{ErrorKind, PathToken, ValidationError, Validator, validate};

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Types
// ============================================================================

/// A JSON value type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl JsonType {
    /// Whether `value` is of this type. `integer` accepts numbers without a
    /// fractional part.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => match value {
                Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
                _ => false,
            },
            Self::Boolean => value.is_boolean(),
            Self::Null => value.is_null(),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `type` keyword: one type name or a list of accepted names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(JsonType),
    Many(Vec<JsonType>),
}

impl TypeSet {
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Single(ty) => ty.matches(value),
            Self::Many(types) => types.iter().any(|ty| ty.matches(value)),
        }
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(ty) => write!(f, "{ty}"),
            Self::Many(types) => {
                let names: Vec<&str> = types.iter().map(|ty| ty.as_str()).collect();
                f.write_str(&names.join(","))
            }
        }
    }
}

impl From<JsonType> for TypeSet {
    fn from(ty: JsonType) -> Self {
        Self::Single(ty)
    }
}

/// The `items` keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Items {
    /// Positional schemas. Elements past the end of the list are unconstrained.
    Tuple(Vec<Schema>),
    /// One schema applied to every element.
    Single(Box<Schema>),
}

// ============================================================================
// Schema
// ============================================================================

/// A schema node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_set: Option<TypeSet>,

    /// Keys an object must contain.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Sub-schemas for object keys, checked in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,

    /// `Some(false)` rejects object keys missing from `properties`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,

    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    /// Regular expression strings must match (unanchored unless the pattern
    /// anchors itself).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Inclusive lower bound for numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    /// The value must satisfy at least one of these.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
}

impl Schema {
    /// A schema accepting anything.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// A schema requiring the given type.
    #[must_use]
    pub fn of_type(ty: impl Into<TypeSet>) -> Self {
        Self {
            type_set: Some(ty.into()),
            ..Self::default()
        }
    }

    /// A schema accepting any of the given types.
    #[must_use]
    pub fn of_types(types: impl IntoIterator<Item = JsonType>) -> Self {
        Self::of_type(TypeSet::Many(types.into_iter().collect()))
    }

    #[must_use]
    pub fn object() -> Self {
        Self::of_type(JsonType::Object)
    }

    #[must_use]
    pub fn array() -> Self {
        Self::of_type(JsonType::Array)
    }

    #[must_use]
    pub fn string() -> Self {
        Self::of_type(JsonType::String)
    }

    #[must_use]
    pub fn number() -> Self {
        Self::of_type(JsonType::Number)
    }

    /// A string that must equal `value`.
    #[must_use]
    pub fn constant_str(value: &str) -> Self {
        Self::string().constant(Value::String(value.to_string()))
    }

    #[must_use]
    pub fn required<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(keys.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn property(mut self, key: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(key.into(), schema);
        self
    }

    /// Reject keys not declared through [`Schema::property`].
    #[must_use]
    pub fn closed(mut self) -> Self {
        self.additional_properties = Some(false);
        self
    }

    #[must_use]
    pub fn items(mut self, schema: Schema) -> Self {
        self.items = Some(Items::Single(Box::new(schema)));
        self
    }

    #[must_use]
    pub fn tuple(mut self, schemas: Vec<Schema>) -> Self {
        self.items = Some(Items::Tuple(schemas));
        self
    }

    #[must_use]
    pub fn constant(mut self, value: Value) -> Self {
        self.const_value = Some(value);
        self
    }

    #[must_use]
    pub fn one_of_values(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    #[must_use]
    pub fn any_of(mut self, schemas: Vec<Schema>) -> Self {
        self.any_of = schemas;
        self
    }

    #[must_use]
    pub fn unique_items(mut self) -> Self {
        self.unique_items = Some(true);
        self
    }

    /// Visit this schema and every nested sub-schema, parents first.
    pub fn walk<'s>(&'s self, visit: &mut impl FnMut(&'s Schema)) {
        visit(self);
        for schema in self.properties.values() {
            schema.walk(visit);
        }
        match &self.items {
            Some(Items::Single(schema)) => schema.walk(visit),
            Some(Items::Tuple(schemas)) => schemas.iter().for_each(|s| s.walk(visit)),
            None => {}
        }
        for schema in &self.any_of {
            schema.walk(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_deserialize_keywords() {
        let schema: Schema = serde_json::from_value(json!({
            "type": "object",
            "required": ["a"],
            "additionalProperties": false,
            "properties": {
                "a": { "type": ["string", "integer"], "pattern": "^x" },
                "b": { "type": "array", "items": [{ "const": 1 }, { "enum": [1, 2] }] },
                "c": { "type": "array", "items": { "minimum": 0 }, "uniqueItems": true },
                "d": { "anyOf": [{ "type": "null" }, { "type": "boolean" }] }
            }
        }))
        .unwrap();

        let expected = Schema::object()
            .required(["a"])
            .closed()
            .property(
                "a",
                Schema::of_types([JsonType::String, JsonType::Integer]).pattern("^x"),
            )
            .property(
                "b",
                Schema::array().tuple(vec![
                    Schema::any().constant(json!(1)),
                    Schema::any().one_of_values(vec![json!(1), json!(2)]),
                ]),
            )
            .property(
                "c",
                Schema::array().items(Schema::any().minimum(0.0)).unique_items(),
            )
            .property(
                "d",
                Schema::any().any_of(vec![
                    Schema::of_type(JsonType::Null),
                    Schema::of_type(JsonType::Boolean),
                ]),
            );
        assert_eq!(schema, expected);
    }

    #[test]
    fn test_property_order_is_declaration_order() {
        let schema = Schema::object()
            .property("z", Schema::any())
            .property("a", Schema::any());
        let keys: Vec<&str> = schema.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a"]);
    }

    #[test]
    fn test_integer_type() {
        assert!(JsonType::Integer.matches(&json!(3)));
        assert!(JsonType::Integer.matches(&json!(3.0)));
        assert!(!JsonType::Integer.matches(&json!(3.5)));
        assert!(!JsonType::Integer.matches(&json!("3")));
        assert!(JsonType::Number.matches(&json!(3.5)));
    }

    #[test]
    fn test_walk_visits_nested() {
        let schema = Schema::object()
            .property("a", Schema::string().pattern("x"))
            .property("b", Schema::array().items(Schema::string().pattern("y")));
        let mut patterns = Vec::new();
        schema.walk(&mut |s| {
            if let Some(p) = &s.pattern {
                patterns.push(p.clone());
            }
        });
        assert_eq!(patterns, ["x", "y"]);
    }
}
