//! Schema validation of document trees

use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::{Items, Schema};
use crate::error::{Error, Result};

/// One step of a path into a document tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathToken {
    /// Object key: element name, attributes group, or attribute name.
    Key(String),
    /// Position in a sequence of repeated siblings.
    Index(usize),
}

impl PathToken {
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(key) => Some(key),
            Self::Index(_) => None,
        }
    }
}

impl From<&str> for PathToken {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<usize> for PathToken {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Which constraint a [`ValidationError`] violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Required,
    Type,
    AdditionalProperties,
    Pattern,
    Minimum,
    Const,
    Enum,
    /// `anyOf`, `uniqueItems`
    Other,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Type => "type",
            Self::AdditionalProperties => "additionalProperties",
            Self::Pattern => "pattern",
            Self::Minimum => "minimum",
            Self::Const => "const",
            Self::Enum => "enum",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Keys and indices from the document root to the offending node. For
    /// `required` this is the parent of the missing key.
    pub path: Vec<PathToken>,
    pub kind: ErrorKind,
    pub message: String,
    /// The missing key (`required`) or the unexpected key
    /// (`additionalProperties`).
    pub argument: Option<String>,
}

impl ValidationError {
    fn new(path: &[PathToken], kind: ErrorKind, message: String) -> Self {
        Self {
            path: path.to_vec(),
            kind,
            message,
            argument: None,
        }
    }

    fn with_argument(mut self, argument: &str) -> Self {
        self.argument = Some(argument.to_string());
        self
    }

    /// The path rendered as `instance.save.region["_@_"].node[0]`.
    #[must_use]
    pub fn property(&self) -> String {
        let mut out = String::from("instance");
        for token in &self.path {
            match token {
                PathToken::Key(key) if is_identifier(key) => {
                    out.push('.');
                    out.push_str(key);
                }
                PathToken::Key(key) => {
                    out.push_str("[\"");
                    out.push_str(key);
                    out.push_str("\"]");
                }
                PathToken::Index(i) => {
                    out.push('[');
                    out.push_str(&i.to_string());
                    out.push(']');
                }
            }
        }
        out
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.property(), self.message)
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

// ============================================================================
// Validator
// ============================================================================

/// A schema with its regular expressions compiled.
#[derive(Debug, Clone)]
pub struct Validator {
    schema: Schema,
    patterns: HashMap<String, Regex>,
}

impl Validator {
    /// Compile every `pattern` in `schema`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSchema`] if a pattern is not a valid regex.
    pub fn new(schema: Schema) -> Result<Self> {
        let mut sources = Vec::new();
        schema.walk(&mut |s| {
            if let Some(pattern) = &s.pattern {
                sources.push(pattern.clone());
            }
        });

        let mut patterns = HashMap::new();
        for source in sources {
            if patterns.contains_key(&source) {
                continue;
            }
            let regex = Regex::new(&source).map_err(|e| Error::InvalidSchema {
                message: format!("invalid pattern `{source}`: {e}"),
            })?;
            patterns.insert(source, regex);
        }

        Ok(Self { schema, patterns })
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validate `node`, returning every violation in traversal order.
    ///
    /// Traversal is depth-first. Object keys are visited in the order the
    /// schema declares them and array elements by position.
    #[must_use]
    pub fn validate(&self, node: &Value) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut path = Vec::new();
        self.check(node, &self.schema, &mut path, &mut errors);
        errors
    }

    /// Whether `node` satisfies `schema` without collecting errors.
    fn is_valid(&self, node: &Value, schema: &Schema) -> bool {
        let mut errors = Vec::new();
        self.check(node, schema, &mut Vec::new(), &mut errors);
        errors.is_empty()
    }

    fn check(
        &self,
        node: &Value,
        schema: &Schema,
        path: &mut Vec<PathToken>,
        errors: &mut Vec<ValidationError>,
    ) {
        // a type mismatch hides every other constraint on this node
        if let Some(types) = &schema.type_set {
            if !types.matches(node) {
                errors.push(ValidationError::new(
                    path,
                    ErrorKind::Type,
                    format!("is not of a type(s) {types}"),
                ));
                return;
            }
        }

        if let Some(expected) = &schema.const_value {
            if node != expected {
                errors.push(ValidationError::new(
                    path,
                    ErrorKind::Const,
                    format!("does not exactly match expected constant: {}", render(expected)),
                ));
            }
        }

        if let Some(values) = &schema.enum_values {
            if !values.contains(node) {
                let listed: Vec<String> = values.iter().map(render).collect();
                errors.push(ValidationError::new(
                    path,
                    ErrorKind::Enum,
                    format!("is not one of enum values: {}", listed.join(",")),
                ));
            }
        }

        match node {
            Value::String(s) => self.check_string(s, schema, path, errors),
            Value::Number(n) => check_number(n.as_f64(), schema, path, errors),
            Value::Object(object) => self.check_object(object, schema, path, errors),
            Value::Array(items) => self.check_array(items, schema, path, errors),
            Value::Bool(_) | Value::Null => {}
        }

        if !schema.any_of.is_empty() && !schema.any_of.iter().any(|s| self.is_valid(node, s)) {
            let candidates: Vec<String> = (0..schema.any_of.len())
                .map(|i| format!("[subschema {i}]"))
                .collect();
            errors.push(ValidationError::new(
                path,
                ErrorKind::Other,
                format!("is not any of {}", candidates.join(",")),
            ));
        }
    }

    fn check_string(
        &self,
        s: &str,
        schema: &Schema,
        path: &[PathToken],
        errors: &mut Vec<ValidationError>,
    ) {
        let Some(source) = &schema.pattern else {
            return;
        };
        // every pattern was compiled in `new`
        if let Some(regex) = self.patterns.get(source) {
            if !regex.is_match(s) {
                errors.push(ValidationError::new(
                    path,
                    ErrorKind::Pattern,
                    format!("does not match pattern \"{source}\""),
                ));
            }
        }
    }

    fn check_object(
        &self,
        object: &serde_json::Map<String, Value>,
        schema: &Schema,
        path: &mut Vec<PathToken>,
        errors: &mut Vec<ValidationError>,
    ) {
        for key in &schema.required {
            if !object.contains_key(key) {
                errors.push(
                    ValidationError::new(
                        path,
                        ErrorKind::Required,
                        format!("requires property \"{key}\""),
                    )
                    .with_argument(key),
                );
            }
        }

        for (key, sub_schema) in &schema.properties {
            if let Some(child) = object.get(key) {
                path.push(PathToken::Key(key.clone()));
                self.check(child, sub_schema, path, errors);
                path.pop();
            }
        }

        if schema.additional_properties == Some(false) {
            for key in object.keys() {
                if !schema.properties.contains_key(key) {
                    path.push(PathToken::Key(key.clone()));
                    errors.push(
                        ValidationError::new(
                            path,
                            ErrorKind::AdditionalProperties,
                            format!("is not allowed to have the additional property \"{key}\""),
                        )
                        .with_argument(key),
                    );
                    path.pop();
                }
            }
        }
    }

    fn check_array(
        &self,
        items: &[Value],
        schema: &Schema,
        path: &mut Vec<PathToken>,
        errors: &mut Vec<ValidationError>,
    ) {
        match &schema.items {
            Some(Items::Single(item_schema)) => {
                for (i, item) in items.iter().enumerate() {
                    path.push(PathToken::Index(i));
                    self.check(item, item_schema, path, errors);
                    path.pop();
                }
            }
            Some(Items::Tuple(schemas)) => {
                // elements past the end of the tuple are unconstrained
                for (i, (item, item_schema)) in items.iter().zip(schemas).enumerate() {
                    path.push(PathToken::Index(i));
                    self.check(item, item_schema, path, errors);
                    path.pop();
                }
            }
            None => {}
        }

        if schema.unique_items == Some(true) {
            let duplicate = items
                .iter()
                .enumerate()
                .any(|(i, a)| items[i + 1..].contains(a));
            if duplicate {
                errors.push(ValidationError::new(
                    path,
                    ErrorKind::Other,
                    "contains duplicate item".to_string(),
                ));
            }
        }
    }
}

fn check_number(
    value: Option<f64>,
    schema: &Schema,
    path: &[PathToken],
    errors: &mut Vec<ValidationError>,
) {
    let (Some(minimum), Some(value)) = (schema.minimum, value) else {
        return;
    };
    if value < minimum {
        errors.push(ValidationError::new(
            path,
            ErrorKind::Minimum,
            format!("must be greater than or equal to {minimum}"),
        ));
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validate `node` against `schema` in one go.
///
/// # Errors
/// Returns [`Error::InvalidSchema`] if the schema has an invalid pattern.
pub fn validate(node: &Value, schema: &Schema) -> Result<Vec<ValidationError>> {
    Ok(Validator::new(schema.clone())?.validate(node))
}
