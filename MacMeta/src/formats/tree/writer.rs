//! Document tree -> XML

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::{Map, Value};

use super::TreeOptions;
use crate::constants::{DECLARATION_KEY, TEXT_KEY};
use crate::error::{Error, Result};

/// Serialize a document tree to an XML string
///
/// The tree must have the shape produced by
/// [`parse_tree`](super::parse_tree) with the same options. Output is
/// tab-indented, and self-closing tags are written as `<tag ... />` like
/// LSLib output.
///
/// # Errors
/// Returns an error if the tree is not an object of elements.
pub fn write_tree(tree: &Value, options: &TreeOptions<'_>) -> Result<String> {
    let Value::Object(document) = tree else {
        return Err(Error::InvalidTree("document must be an object".to_string()));
    };

    let mut output = Vec::new();
    let mut writer = Writer::new_with_indent(&mut output, b'\t', 1);

    for (key, value) in document {
        if key == DECLARATION_KEY {
            write_declaration(&mut writer, value, options)?;
        } else {
            write_element(&mut writer, key, value, options)?;
        }
    }

    let xml = String::from_utf8(output)?;
    // Fix spacing before self-closing tags
    let xml = xml.replace("/>", " />");
    Ok(xml)
}

fn write_declaration<W: std::io::Write>(
    writer: &mut Writer<W>,
    value: &Value,
    options: &TreeOptions<'_>,
) -> Result<()> {
    let attributes = attributes_of(value, options);
    let lookup = |name: &str| {
        attributes
            .and_then(|attrs| attrs.get(name))
            .map(render_scalar)
    };

    let version = lookup("version").unwrap_or_else(|| "1.0".to_string());
    let encoding = lookup("encoding");
    let standalone = lookup("standalone");

    writer.write_event(Event::Decl(BytesDecl::new(
        &version,
        encoding.as_deref(),
        standalone.as_deref(),
    )))?;
    Ok(())
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: &Value,
    options: &TreeOptions<'_>,
) -> Result<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                if item.is_array() {
                    return Err(Error::InvalidTree(format!("nested array under `{tag}`")));
                }
                write_element(writer, tag, item, options)?;
            }
        }
        Value::Object(object) => write_object(writer, tag, object, options)?,
        scalar => {
            let text = render_scalar(scalar);
            if text.is_empty() {
                writer.write_event(Event::Empty(BytesStart::new(tag)))?;
            } else {
                writer.write_event(Event::Start(BytesStart::new(tag)))?;
                writer.write_event(Event::Text(BytesText::new(&text)))?;
                writer.write_event(Event::End(BytesEnd::new(tag)))?;
            }
        }
    }
    Ok(())
}

fn write_object<W: std::io::Write>(
    writer: &mut Writer<W>,
    tag: &str,
    object: &Map<String, Value>,
    options: &TreeOptions<'_>,
) -> Result<()> {
    let mut start = BytesStart::new(tag);
    let mut children: Vec<(&String, &Value)> = Vec::new();
    let mut text = None;

    for (key, value) in object {
        if key == TEXT_KEY {
            text = Some(render_scalar(value));
        } else if options.attributes_group == Some(key.as_str()) {
            let Value::Object(attributes) = value else {
                return Err(Error::InvalidTree(format!(
                    "attributes of `{tag}` must be an object"
                )));
            };
            for (name, attr) in attributes {
                start.push_attribute((name.as_str(), render_scalar(attr).as_str()));
            }
        } else if options.attributes_group.is_none() && !(value.is_object() || value.is_array()) {
            // without a group, scalar members are attributes
            start.push_attribute((key.as_str(), render_scalar(value).as_str()));
        } else {
            children.push((key, value));
        }
    }

    let text = text.filter(|t| !t.is_empty());
    if children.is_empty() && text.is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start.borrow()))?;
    if let Some(text) = text {
        writer.write_event(Event::Text(BytesText::new(&text)))?;
    }
    for (key, value) in children {
        write_element(writer, key, value, options)?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn attributes_of<'v>(value: &'v Value, options: &TreeOptions<'_>) -> Option<&'v Map<String, Value>> {
    match options.attributes_group {
        Some(group) => value.get(group)?.as_object(),
        None => value.as_object(),
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::tree::parse_tree;
    use pretty_assertions::assert_eq;

    const META: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<save>
	<version major="4" minor="0" revision="9" build="331" />
	<region id="Config">
		<node id="root">
			<children>
				<node id="ModuleInfo">
					<attribute id="Name" type="LSString" value="A &amp; B" />
					<attribute id="Version64" type="int64" value="36028797018963968" />
				</node>
			</children>
		</node>
	</region>
</save>"#;

    #[test]
    fn test_write_reproduces_lsx_layout() {
        let options = TreeOptions::default().with_parse_values(false);
        let tree = parse_tree(META, &options).unwrap();
        let xml = write_tree(&tree, &options).unwrap();
        assert_eq!(xml, META);
    }

    #[test]
    fn test_write_text_and_empty() {
        let options = TreeOptions::default();
        let tree = parse_tree(
            r#"<contentList><content contentuid="h1" version="1">Hi</content><empty/></contentList>"#,
            &options,
        )
        .unwrap();
        let xml = write_tree(&tree, &options).unwrap();
        assert_eq!(
            xml,
            "<contentList>\n\t<content contentuid=\"h1\" version=\"1\">Hi</content>\n\t<empty />\n</contentList>"
        );
    }

    #[test]
    fn test_write_rejects_non_object() {
        let err = write_tree(&Value::String("x".into()), &TreeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidTree(_)));
    }
}
