//! Process-wide constants and regular expressions
//!
//! Everything here is initialized once on first use and read-only afterwards.

use lazy_static::lazy_static;
use regex::Regex;

/// Tree key under which an element's XML attributes are grouped.
pub const ATTRIBUTES_GROUP: &str = "_@_";

/// Tree key holding an element's text when it also has attributes or children.
pub const TEXT_KEY: &str = "#text";

/// Tree key holding the `<?xml ... ?>` declaration.
pub const DECLARATION_KEY: &str = "?xml";

/// Default name of the diagnostics source reported with every problem.
pub const DIAGNOSTICS_SOURCE: &str = "BG3XML";

/// Pattern of a lowercase localization handle (`h` + UUID with `-` -> `g`).
pub const HANDLE_PATTERN: &str = r"^h[0-9a-f]{8}(g[0-9a-f]{4}){3}g[0-9a-f]{12}$";

/// Pattern of a lowercase hyphenated UUID, as written in descriptor files.
pub const UUID_PATTERN: &str = r"^[0-9a-f]{8}-([0-9a-f]{4}-){3}[0-9a-f]{12}$";

lazy_static! {
    /// A hyphenated UUID, any case.
    pub static ref UUID: Regex =
        Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
            .expect("UUID regex is valid");

    /// A localization handle.
    pub static ref HANDLE: Regex = Regex::new(HANDLE_PATTERN).expect("handle regex is valid");

    /// The ModuleInfo/dependency `Version64` attribute line of a `meta.lsx`.
    pub static ref VERSION64_LINE: Regex =
        Regex::new(r#"<attribute\s+id="Version64"\s+type="int64"\s+value="(\d+)"\s*/>"#)
            .expect("Version64 regex is valid");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_regex() {
        assert!(UUID.is_match("123e4567-e89b-12d3-a456-426614174000"));
        assert!(UUID.is_match("123E4567-E89B-12D3-A456-426614174000"));
        assert!(!UUID.is_match("123e4567-e89b-12d3-a456-42661417400"));
        assert!(!UUID.is_match("hello world"));
        assert!(!UUID.is_match("h123e4567ge89bg12d3ga456g426614174000"));
        assert!(!UUID.is_match(""));
        assert!(!UUID.is_match("123e4567e89b-12d3-a456-426614174000"));
    }

    #[test]
    fn test_handle_regex() {
        assert!(HANDLE.is_match("h123e4567ge89bg12d3ga456g426614174000"));
        assert!(!HANDLE.is_match("h123e4567ge89bg12d3ga456g42661417400"));
        assert!(!HANDLE.is_match("hello world"));
        assert!(!HANDLE.is_match("123e4567-e89b-12d3-a456-426614174000"));
        assert!(!HANDLE.is_match(""));
    }

    #[test]
    fn test_version64_line_regex() {
        let line = r#"    <attribute id="Version64" type="int64" value="36028797018963968" />"#;
        let caps = VERSION64_LINE.captures(line).unwrap();
        assert_eq!(&caps[1], "36028797018963968");
        assert!(VERSION64_LINE.is_match(r#"<attribute id="Version64" type="int64" value="1"/>"#));
        assert!(!VERSION64_LINE.is_match(r#"<attribute id="UUID" type="FixedString" value="1"/>"#));
    }
}
