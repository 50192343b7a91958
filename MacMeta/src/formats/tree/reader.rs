//! XML -> document tree

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesDecl, BytesStart, Event};
use serde_json::{Map, Number, Value};

use super::TreeOptions;
use crate::constants::{DECLARATION_KEY, TEXT_KEY};
use crate::error::{Error, Result};

/// Largest integer a JSON number holds exactly (2^53 - 1).
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// An element whose end tag has not been read yet.
struct Frame {
    tag: String,
    path: String,
    attributes: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn new(tag: String, parent_path: Option<&str>) -> Self {
        let path = match parent_path {
            Some(parent) => format!("{parent}.{tag}"),
            None => tag.clone(),
        };
        Self {
            tag,
            path,
            attributes: Map::new(),
            children: Map::new(),
            text: String::new(),
        }
    }

    fn into_value(self, options: &TreeOptions<'_>) -> (String, String, Value) {
        let text = self.text.trim();

        if self.attributes.is_empty() && self.children.is_empty() {
            let value = scalar(text, options.parse_values);
            return (self.tag, self.path, value);
        }

        let mut object = Map::new();
        if !self.attributes.is_empty() {
            match options.attributes_group {
                Some(group) => {
                    object.insert(group.to_string(), Value::Object(self.attributes));
                }
                None => object.extend(self.attributes),
            }
        }
        object.extend(self.children);
        if !text.is_empty() {
            object.insert(TEXT_KEY.to_string(), scalar(text, options.parse_values));
        }

        (self.tag, self.path, Value::Object(object))
    }
}

/// Read an XML file from disk into a document tree
///
/// # Errors
/// Returns an error if the file cannot be read or is not well-formed XML.
pub fn read_tree<P: AsRef<Path>>(path: P, options: &TreeOptions<'_>) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    parse_tree(&content, options)
}

/// Parse XML text into a document tree
///
/// # Errors
/// Returns an error if the XML is malformed (mismatched or unclosed tags,
/// bad attributes).
pub fn parse_tree(content: &str, options: &TreeOptions<'_>) -> Result<Value> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut document = Map::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let frame = open_frame(&e, stack.last(), options)?;
                stack.push(frame);
            }
            Ok(Event::Empty(e)) => {
                let frame = open_frame(&e, stack.last(), options)?;
                close_frame(frame, &mut stack, &mut document, options);
            }
            Ok(Event::End(_)) => {
                // quick-xml already verified the end name matches
                if let Some(frame) = stack.pop() {
                    close_frame(frame, &mut stack, &mut document, options);
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&e.unescape()?);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::Decl(e)) => {
                if !options.ignore_declaration {
                    let attributes = declaration_attributes(&e, options)?;
                    document.insert(DECLARATION_KEY.to_string(), group(attributes, options));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlError(e)),
            // comments, processing instructions, doctype
            _ => {}
        }
        buf.clear();
    }

    if let Some(frame) = stack.last() {
        let (line, column) = line_column(content, content.len());
        return Err(Error::XmlSyntax {
            line,
            column,
            message: format!("Unclosed tag `{}`", frame.tag),
        });
    }

    Ok(Value::Object(document))
}

fn open_frame(
    e: &BytesStart<'_>,
    parent: Option<&Frame>,
    options: &TreeOptions<'_>,
) -> Result<Frame> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut frame = Frame::new(tag, parent.map(|p| p.path.as_str()));

    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?;
        frame
            .attributes
            .insert(key, scalar(&value, options.parse_values));
    }

    Ok(frame)
}

fn close_frame(
    frame: Frame,
    stack: &mut [Frame],
    document: &mut Map<String, Value>,
    options: &TreeOptions<'_>,
) {
    let (tag, path, value) = frame.into_value(options);
    let force_array = (options.always_array)(&tag, &path);
    let parent = match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => document,
    };
    insert_child(parent, tag, value, force_array);
}

/// Add `value` under `tag`, collapsing repeated tags into an array.
fn insert_child(map: &mut Map<String, Value>, tag: String, value: Value, force_array: bool) {
    match map.get_mut(&tag) {
        // element values are never arrays, so an array here holds repeated siblings
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            let value = if force_array {
                Value::Array(vec![value])
            } else {
                value
            };
            map.insert(tag, value);
        }
    }
}

fn declaration_attributes(
    decl: &BytesDecl<'_>,
    options: &TreeOptions<'_>,
) -> Result<Map<String, Value>> {
    let mut attributes = Map::new();

    let version = decl.version()?;
    attributes.insert(
        "version".to_string(),
        scalar(&String::from_utf8_lossy(&version), options.parse_values),
    );
    if let Some(encoding) = decl.encoding() {
        let encoding = encoding?;
        attributes.insert(
            "encoding".to_string(),
            Value::String(String::from_utf8_lossy(&encoding).into_owned()),
        );
    }
    if let Some(standalone) = decl.standalone() {
        let standalone = standalone?;
        attributes.insert(
            "standalone".to_string(),
            Value::String(String::from_utf8_lossy(&standalone).into_owned()),
        );
    }

    Ok(attributes)
}

fn group(attributes: Map<String, Value>, options: &TreeOptions<'_>) -> Value {
    match options.attributes_group {
        Some(group) => {
            let mut object = Map::new();
            object.insert(group.to_string(), Value::Object(attributes));
            Value::Object(object)
        }
        None => Value::Object(attributes),
    }
}

/// Convert element text or an attribute value to a tree scalar.
pub(crate) fn scalar(text: &str, parse_values: bool) -> Value {
    if parse_values {
        if let Some(value) = parse_scalar(text) {
            return value;
        }
    }
    Value::String(text.to_string())
}

/// Booleans and numbers, but only when rendering the value back yields the
/// exact source text. Anything else stays a string.
fn parse_scalar(text: &str) -> Option<Value> {
    match text {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        _ => {}
    }

    if let Ok(int) = text.parse::<i64>() {
        let exact = int.unsigned_abs() <= MAX_SAFE_INTEGER && int.to_string() == text;
        return exact.then(|| Value::from(int));
    }

    let float = text.parse::<f64>().ok().filter(|f| f.is_finite())?;
    let number = Number::from_f64(float)?;
    (number.to_string() == text).then_some(Value::Number(number))
}

/// Zero-based line and character column of a byte offset into `text`.
pub(crate) fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &text[..offset];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count();
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_attributes_group_and_repeated_siblings() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<save>
    <version major="4" minor="0" revision="9" build="331"/>
    <region id="Config">
        <node id="a"/>
        <node id="b"/>
    </region>
</save>"#;
        let tree = parse_tree(xml, &TreeOptions::default()).unwrap();
        assert_eq!(
            tree,
            json!({
                "?xml": { "_@_": { "version": 1.0, "encoding": "utf-8" } },
                "save": {
                    "version": { "_@_": { "major": 4, "minor": 0, "revision": 9, "build": 331 } },
                    "region": {
                        "_@_": { "id": "Config" },
                        "node": [
                            { "_@_": { "id": "a" } },
                            { "_@_": { "id": "b" } }
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn test_text_elements() {
        let xml = r#"<contentList><content contentuid="h1" version="1">Hello &amp; bye</content><empty></empty><plain>text</plain></contentList>"#;
        let tree = parse_tree(xml, &TreeOptions::default()).unwrap();
        assert_eq!(
            tree["contentList"],
            json!({
                "content": { "_@_": { "contentuid": "h1", "version": 1 }, "#text": "Hello & bye" },
                "empty": "",
                "plain": "text"
            })
        );
    }

    #[test]
    fn test_always_array_and_plain_values() {
        fn children_node(tag: &str, path: &str) -> bool {
            tag == "node" && path.ends_with("children.node")
        }
        let options = TreeOptions::default()
            .with_parse_values(false)
            .with_ignore_declaration(true)
            .with_always_array(children_node);
        let xml = r#"<?xml version="1.0"?><node id="root"><children><node id="x" n="4"/></children></node>"#;
        let tree = parse_tree(xml, &options).unwrap();
        assert_eq!(
            tree,
            json!({
                "node": {
                    "_@_": { "id": "root" },
                    "children": { "node": [ { "_@_": { "id": "x", "n": "4" } } ] }
                }
            })
        );
    }

    #[test]
    fn test_no_attributes_group_merges() {
        let options = TreeOptions::default().with_attributes_group(None);
        let tree = parse_tree(r#"<a id="x"><b>1</b></a>"#, &options).unwrap();
        assert_eq!(tree, json!({ "a": { "id": "x", "b": 1 } }));
    }

    #[test]
    fn test_lossy_numbers_stay_strings() {
        assert_eq!(scalar("36028797018963968", true), json!("36028797018963968"));
        assert_eq!(scalar("007", true), json!("007"));
        assert_eq!(scalar("1e5", true), json!("1e5"));
        assert_eq!(scalar("+3", true), json!("+3"));
        assert_eq!(scalar("-12", true), json!(-12));
        assert_eq!(scalar("0.5", true), json!(0.5));
        assert_eq!(scalar("true", true), json!(true));
        assert_eq!(scalar("true", false), json!("true"));
        assert_eq!(scalar("", true), json!(""));
    }

    #[test]
    fn test_unclosed_tag_is_syntax_error() {
        assert!(parse_tree("<a>\n<b>\n", &TreeOptions::default()).is_err());
    }

    #[test]
    fn test_mismatched_tag_is_error() {
        assert!(parse_tree("<a></b>", &TreeOptions::default()).is_err());
    }

    #[test]
    fn test_line_column() {
        let text = "ab\ncdé\nf";
        assert_eq!(line_column(text, 0), (0, 0));
        assert_eq!(line_column(text, 3), (1, 0));
        assert_eq!(line_column(text, 7), (1, 3));
        assert_eq!(line_column(text, 100), (2, 1));
    }
}
