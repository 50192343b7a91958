//! XML well-formedness check

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};
use crate::formats::tree::line_column;

/// Check that `text` is a well-formed XML document.
///
/// Catches everything the tree parser would reject plus unclosed elements,
/// a missing or repeated root element and text outside the root.
///
/// # Errors
/// Returns [`Error::XmlSyntax`] positioned at the offending markup.
pub fn check_well_formed(text: &str) -> Result<()> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(false);

    let syntax_error = |offset: usize, message: String| {
        let (line, column) = line_column(text, offset);
        Error::XmlSyntax {
            line,
            column,
            message,
        }
    };

    let mut open: Vec<(String, usize)> = Vec::new();
    let mut root_seen = false;
    let mut buf = Vec::new();

    loop {
        let start = markup_start(text, reader.buffer_position());
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| syntax_error(start, e.to_string()))?;

        match event {
            Event::Start(e) | Event::Empty(e) if open.is_empty() && root_seen => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                return Err(syntax_error(
                    start,
                    format!("Multiple root elements: `{name}` follows the root element"),
                ));
            }
            Event::Start(e) => {
                for attr in e.attributes() {
                    attr.map_err(|err| syntax_error(start, err.to_string()))?;
                }
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                open.push((name, start));
                root_seen = true;
            }
            Event::Empty(e) => {
                for attr in e.attributes() {
                    attr.map_err(|err| syntax_error(start, err.to_string()))?;
                }
                root_seen = true;
            }
            Event::End(_) => {
                open.pop();
            }
            Event::Text(e) if open.is_empty() => {
                let content = e
                    .unescape()
                    .map_err(|err| syntax_error(start, err.to_string()))?;
                if !content.trim().is_empty() {
                    let leading = e.iter().take_while(|b| b.is_ascii_whitespace()).count();
                    return Err(syntax_error(
                        start + leading,
                        "Text data outside of root node".to_string(),
                    ));
                }
            }
            Event::Text(e) => {
                e.unescape()
                    .map_err(|err| syntax_error(start, err.to_string()))?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some((name, offset)) = open.pop() {
        return Err(syntax_error(offset, format!("Unclosed tag `{name}`")));
    }
    if !root_seen {
        return Err(syntax_error(text.len(), "Start tag expected".to_string()));
    }

    Ok(())
}

/// quick-xml consumes the `<` of a tag while reading the text before it.
fn markup_start(text: &str, offset: usize) -> usize {
    if offset > 0 && text.as_bytes().get(offset - 1) == Some(&b'<') {
        offset - 1
    } else {
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(text: &str) -> (usize, usize, String) {
        match check_well_formed(text) {
            Err(Error::XmlSyntax {
                line,
                column,
                message,
            }) => (line, column, message),
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_well_formed() {
        let xml = "<?xml version=\"1.0\"?>\n<!-- c -->\n<a x=\"1\">\n  <b/>\n  text &amp; more\n</a>\n";
        assert!(check_well_formed(xml).is_ok());
    }

    #[test]
    fn test_mismatched_end_tag() {
        let (line, column, _) = position("<a>\n  <b>\n  </c>\n</a>");
        assert_eq!((line, column), (2, 2));
    }

    #[test]
    fn test_unclosed_tag_points_at_opening() {
        let (line, column, message) = position("<a>\n\t<b>\n</a>\n");
        // `</a>` closes `<b>` by name mismatch first
        assert_eq!(line, 2);
        assert_eq!(column, 0);
        assert!(!message.is_empty());

        let (line, column, message) = position("<a>\n\t<b>\n");
        assert_eq!((line, column), (1, 1));
        assert_eq!(message, "Unclosed tag `b`");
    }

    #[test]
    fn test_multiple_roots() {
        let (line, _, message) = position("<a/>\n<b/>");
        assert_eq!(line, 1);
        assert!(message.starts_with("Multiple root elements"));
    }

    #[test]
    fn test_text_outside_root() {
        let (line, _, _) = position("<a/>\nstray");
        assert_eq!(line, 1);
    }

    #[test]
    fn test_duplicate_attribute() {
        let (line, _, _) = position("<a>\n<b x=\"1\" x=\"2\"/>\n</a>");
        assert_eq!(line, 1);
    }

    #[test]
    fn test_empty_document() {
        let (_, _, message) = position("   ");
        assert_eq!(message, "Start tag expected");
    }
}
