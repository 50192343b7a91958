//! Mapping validation paths back to source positions
//!
//! The document tree carries no byte offsets, so positions are recovered by
//! scanning the raw text for the same tag names that produced the tree. The
//! scan only moves forward: every token is looked up after the tag the
//! previous token anchored on, which may sit later on the same line.

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::constants::{ATTRIBUTES_GROUP, TEXT_KEY};
use crate::schema::PathToken;

/// Best-effort location of a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourcePosition {
    /// Zero-based line.
    pub line: usize,
    /// Zero-based character column where the offending attribute starts.
    pub col_start: Option<usize>,
    /// Zero-based character column just past the offending attribute.
    pub col_end: Option<usize>,
}

impl SourcePosition {
    fn at_line(line: usize) -> Self {
        Self {
            line,
            ..Self::default()
        }
    }
}

/// Resolves paths against one document's text.
///
/// Build once per document and reuse for every error of that document.
#[derive(Debug)]
pub struct PathResolver<'a> {
    lines: Vec<&'a str>,
    tags: Vec<Tag<'a>>,
    attributes_group: &'a str,
}

impl<'a> PathResolver<'a> {
    #[must_use]
    pub fn new(text: &'a str, attributes_group: &'a str) -> Self {
        Self::from_lines(text.lines().collect(), attributes_group)
    }

    #[must_use]
    pub fn from_lines(lines: Vec<&'a str>, attributes_group: &'a str) -> Self {
        let tags = scan_tags(&lines);
        Self {
            lines,
            tags,
            attributes_group,
        }
    }

    /// Resolve `path` to a line and, for attribute paths, a column range.
    ///
    /// Never fails: a token that cannot be found stops resolution at the
    /// last anchored line without column information.
    #[must_use]
    pub fn resolve(&self, path: &[PathToken]) -> SourcePosition {
        // index into `tags` of the last anchored element
        let mut anchor: Option<usize> = None;
        let mut parent_part: Option<&str> = None;
        let mut tokens = path.iter();

        while let Some(token) = tokens.next() {
            match token {
                PathToken::Key(key) if key == self.attributes_group => {
                    let Some(PathToken::Key(attribute)) = tokens.next() else {
                        break;
                    };
                    return self.resolve_attribute(anchor, attribute);
                }
                PathToken::Key(key) if key == TEXT_KEY => {}
                PathToken::Key(key) => {
                    let from = anchor.map_or(0, |tag| tag + 1);
                    match self.find_open_tag(key, from) {
                        Some(tag) => {
                            debug!("resolved `{key}` to line {}", self.tags[tag].line);
                            anchor = Some(tag);
                            parent_part = Some(key);
                        }
                        None => {
                            warn!("could not find `<{key}` after tag {from}, position is approximate");
                            break;
                        }
                    }
                }
                PathToken::Index(index) => {
                    let (Some(start), Some(name)) = (anchor, parent_part) else {
                        break;
                    };
                    match self.find_sibling(name, start, *index) {
                        Some(tag) => {
                            debug!("resolved `{name}[{index}]` to line {}", self.tags[tag].line);
                            anchor = Some(tag);
                        }
                        None => {
                            warn!("could not find `<{name}` occurrence {index}, position is approximate");
                            break;
                        }
                    }
                }
            }
        }

        SourcePosition::at_line(anchor.map_or(0, |tag| self.tags[tag].line))
    }

    /// First tag at or after `from` opening `<name`.
    fn find_open_tag(&self, name: &str, from: usize) -> Option<usize> {
        (from..self.tags.len()).find(|&i| self.tags[i].opens(name))
    }

    /// The `index`-th `<name` sibling, counting the tag at `start` as 0.
    ///
    /// Only openings at the nesting depth of `start` count, so descendants
    /// sharing the name are skipped. The search ends when the enclosing
    /// element closes.
    fn find_sibling(&self, name: &str, start: usize, index: usize) -> Option<usize> {
        let depth = self.tags[start].depth;
        let mut remaining = index;

        for (i, tag) in self.tags.iter().enumerate().skip(start) {
            if tag.kind == TagKind::Close {
                if tag.depth <= depth {
                    return None;
                }
                continue;
            }
            if tag.depth == depth && tag.opens(name) {
                if remaining == 0 {
                    return Some(i);
                }
                remaining -= 1;
            }
        }
        None
    }

    fn resolve_attribute(&self, anchor: Option<usize>, attribute: &str) -> SourcePosition {
        let (line, offset) = anchor.map_or((0, 0), |tag| (self.tags[tag].line, self.tags[tag].offset));
        let position = SourcePosition::at_line(line);
        let Some(text) = self.lines.get(line) else {
            return position;
        };
        // attributes belong to the anchored tag, not to earlier tags on the line
        let rest = &text[offset..];
        if !rest.contains(attribute) {
            return position;
        }

        let pattern = format!(
            r#"(?:^|[\s<])({}\s*=\s*(?:"[^"]*"|'[^']*'))"#,
            regex::escape(attribute)
        );
        let Ok(regex) = Regex::new(&pattern) else {
            return position;
        };
        let Some(found) = regex.captures(rest).and_then(|caps| caps.get(1)) else {
            return position;
        };

        let col_start = text[..offset + found.start()].chars().count();
        let col_end = col_start + found.as_str().chars().count();
        SourcePosition {
            line,
            col_start: Some(col_start),
            col_end: Some(col_end),
        }
    }
}

/// Resolve one path against `lines`, grouping attributes under `_@_`.
#[must_use]
pub fn resolve_position(lines: &[&str], path: &[PathToken]) -> SourcePosition {
    PathResolver::from_lines(lines.to_vec(), ATTRIBUTES_GROUP).resolve(path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Open,
    Close,
    /// `<?...?>`, `<!...>`
    Other,
}

/// One `<` markup opening in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tag<'a> {
    line: usize,
    /// Byte offset of `<` within the line.
    offset: usize,
    kind: TagKind,
    /// Tag name; declarations keep their `?`/`!` prefix.
    name: &'a str,
    /// Element nesting depth just before the tag.
    depth: usize,
}

impl Tag<'_> {
    fn opens(&self, name: &str) -> bool {
        self.kind != TagKind::Close && self.name == name
    }
}

/// Every tag in `lines`, in document order.
fn scan_tags<'a>(lines: &[&'a str]) -> Vec<Tag<'a>> {
    let mut tags = Vec::new();
    let mut depth = 0usize;
    let mut open: Option<TagKind> = None;
    let mut quote: Option<char> = None;

    for (line_index, line) in lines.iter().enumerate() {
        let mut chars = line.char_indices().peekable();
        let mut prev = '\0';

        while let Some((offset, c)) = chars.next() {
            match (open, quote) {
                (None, _) => {
                    if c == '<' {
                        let kind = match chars.peek() {
                            Some(&(_, '/')) => TagKind::Close,
                            Some(&(_, '?' | '!')) => TagKind::Other,
                            _ => TagKind::Open,
                        };
                        tags.push(Tag {
                            line: line_index,
                            offset,
                            kind,
                            name: tag_name(&line[offset + 1..], kind),
                            depth,
                        });
                        open = Some(kind);
                    }
                }
                (Some(_), Some(q)) => {
                    if c == q {
                        quote = None;
                    }
                }
                (Some(kind), None) => match c {
                    '"' | '\'' if kind == TagKind::Open => quote = Some(c),
                    '>' => {
                        match kind {
                            TagKind::Open if prev != '/' => depth += 1,
                            TagKind::Close => depth = depth.saturating_sub(1),
                            _ => {}
                        }
                        open = None;
                    }
                    _ => {}
                },
            }
            prev = c;
        }
    }

    tags
}

/// The name at the start of `rest` (the text after `<`).
fn tag_name(rest: &str, kind: TagKind) -> &str {
    let rest = match kind {
        TagKind::Close => rest.strip_prefix('/').unwrap_or(rest),
        _ => rest,
    };
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(rest.len());
    &rest[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn path(tokens: &[PathToken]) -> Vec<PathToken> {
        tokens.to_vec()
    }

    fn key(k: &str) -> PathToken {
        PathToken::from(k)
    }

    const SIBLINGS: &str = r#"<save>
	<region id="Config">
		<node id="root">
			<children>
				<node id="first">
					<children>
						<node id="nested" />
					</children>
				</node>
				<node id="second" />
				<node id="third" attr="x" />
			</children>
		</node>
	</region>
</save>"#;

    #[test]
    fn test_nth_sibling_resolves_to_its_own_line() {
        let resolver = PathResolver::new(SIBLINGS, ATTRIBUTES_GROUP);
        let base = [key("save"), key("region"), key("node"), key("children"), key("node")];

        let expected = [4, 9, 10];
        for (n, line) in expected.into_iter().enumerate() {
            let mut p = base.to_vec();
            p.push(PathToken::Index(n));
            assert_eq!(resolver.resolve(&p).line, line, "occurrence {n}");
        }
    }

    #[test]
    fn test_attribute_columns() {
        let resolver = PathResolver::new(SIBLINGS, ATTRIBUTES_GROUP);
        let p = path(&[
            key("save"),
            key("region"),
            key("node"),
            key("children"),
            key("node"),
            PathToken::Index(2),
            key("_@_"),
            key("attr"),
        ]);
        let position = resolver.resolve(&p);
        assert_eq!(position.line, 10);
        // four tabs, then `<node id="third" `
        assert_eq!(position.col_start, Some(21));
        assert_eq!(position.col_end, Some(29));
    }

    #[test]
    fn test_missing_attribute_keeps_line_without_columns() {
        let resolver = PathResolver::new(SIBLINGS, ATTRIBUTES_GROUP);
        let p = path(&[key("save"), key("region"), key("_@_"), key("missing")]);
        assert_eq!(resolver.resolve(&p), SourcePosition::at_line(1));
    }

    #[test]
    fn test_unknown_token_degrades_to_last_anchor() {
        let resolver = PathResolver::new(SIBLINGS, ATTRIBUTES_GROUP);
        let p = path(&[key("save"), key("region"), key("nowhere"), key("node")]);
        assert_eq!(resolver.resolve(&p), SourcePosition::at_line(1));

        let p = path(&[key("save"), key("region"), key("node"), key("children"), key("node"), PathToken::Index(5)]);
        assert_eq!(resolver.resolve(&p).line, 4);
    }

    #[test]
    fn test_never_walks_backward() {
        // `region` appears before `save` in the text; the anchor must not move back to it
        let text = "<region/>\n<save>\n<x/>\n</save>";
        let lines: Vec<&str> = text.lines().collect();
        let position = resolve_position(&lines, &[key("save"), key("region")]);
        assert_eq!(position.line, 1);
    }

    #[test]
    fn test_tag_prefix_needs_name_boundary() {
        let text = "<root>\n<versionInfo/>\n<version major=\"1\"/>\n</root>";
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(resolve_position(&lines, &[key("root"), key("version")]).line, 2);
    }

    #[test]
    fn test_text_token_stays_on_anchor() {
        let text = "<contentList>\n<content contentuid=\"h1\" version=\"1\">Hi</content>\n</contentList>";
        let lines: Vec<&str> = text.lines().collect();
        let p = [key("contentList"), key("content"), PathToken::Index(0), key("#text")];
        assert_eq!(resolve_position(&lines, &p).line, 1);
    }

    #[test]
    fn test_empty_path_is_line_zero() {
        assert_eq!(resolve_position(&["<a/>"], &[]), SourcePosition::at_line(0));
    }

    #[test]
    fn test_compact_siblings_share_the_anchor_line() {
        let text = "<a>\n\t<list><item k=\"v\"/>\n\t\t<item/>\n\t\t<item/>\n\t</list>\n</a>";
        let resolver = PathResolver::new(text, ATTRIBUTES_GROUP);
        let base = [key("a"), key("list"), key("item")];

        for (n, line) in [1, 2, 3].into_iter().enumerate() {
            let mut p = base.to_vec();
            p.push(PathToken::Index(n));
            assert_eq!(resolver.resolve(&p).line, line, "occurrence {n}");
        }

        let mut p = base.to_vec();
        p.extend([PathToken::Index(0), key("_@_"), key("k")]);
        let position = resolver.resolve(&p);
        assert_eq!(position.line, 1);
        // tab, then `<list><item `
        assert_eq!(position.col_start, Some(13));
        assert_eq!(position.col_end, Some(18));
    }

    #[test]
    fn test_scan_tags_tracks_depth() {
        let lines: Vec<&str> = SIBLINGS.lines().collect();
        let nodes: Vec<(usize, usize)> = scan_tags(&lines)
            .iter()
            .filter(|tag| tag.opens("node"))
            .map(|tag| (tag.line, tag.depth))
            .collect();
        assert_eq!(nodes, [(2, 2), (4, 4), (6, 6), (9, 4), (10, 4)]);
    }

    #[test]
    fn test_scan_tags_ignore_quoted_gt() {
        let lines = ["<a x=\"1 > 0\">", "<b/>", "</a>", "<?xml version=\"1.0\"?>"];
        let tags: Vec<(TagKind, &str, usize)> = scan_tags(&lines)
            .iter()
            .map(|tag| (tag.kind, tag.name, tag.depth))
            .collect();
        assert_eq!(
            tags,
            [
                (TagKind::Open, "a", 0),
                (TagKind::Open, "b", 1),
                (TagKind::Close, "a", 1),
                (TagKind::Other, "?xml", 0),
            ]
        );
    }
}
