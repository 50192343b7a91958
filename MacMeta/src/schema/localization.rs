//! Schema for localization XML
//!
//! ```xml
//! <contentList>
//!   <content contentuid="h0123...g...." version="1">Text</content>
//! </contentList>
//! ```

use super::partials::{text, xml_declaration};
use super::Schema;
use crate::constants::{ATTRIBUTES_GROUP, DECLARATION_KEY, HANDLE_PATTERN, TEXT_KEY};

/// One `<content>` entry.
fn content() -> Schema {
    Schema::object()
        .required([ATTRIBUTES_GROUP])
        .property(
            ATTRIBUTES_GROUP,
            Schema::object()
                .required(["contentuid", "version"])
                .property("contentuid", Schema::string().pattern(HANDLE_PATTERN))
                .property("version", Schema::number().minimum(0.0)),
        )
        .property(TEXT_KEY, text())
}

/// The localization XML schema. Expects `content` forced into an array.
pub fn schema() -> Schema {
    Schema::object()
        .required([DECLARATION_KEY, "contentList"])
        .property(DECLARATION_KEY, xml_declaration())
        .property(
            "contentList",
            Schema::object()
                .required(["content"])
                .closed()
                .property("content", Schema::array().items(content())),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ErrorKind, PathToken, validate};
    use serde_json::json;

    #[test]
    fn test_bad_handle_is_pattern_error() {
        let doc = json!({
            "?xml": { "_@_": { "version": 1.0, "encoding": "utf-8" } },
            "contentList": { "content": [
                { "_@_": { "contentuid": "h123e4567ge89bg12d3ga456g426614174000", "version": 1 }, "#text": "ok" },
                { "_@_": { "contentuid": "nope", "version": 1 }, "#text": "bad" }
            ]}
        });
        let errors = validate(&doc, &schema()).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Pattern);
        assert_eq!(
            errors[0].path,
            vec![
                PathToken::from("contentList"),
                PathToken::from("content"),
                PathToken::from(1),
                PathToken::from("_@_"),
                PathToken::from("contentuid"),
            ]
        );
    }
}
