//! Packed `Version64` numbers
//!
//! BG3 stores mod versions as one 64-bit integer:
//!
//! | field    | bits  | width |
//! |----------|-------|-------|
//! | major    | 55-63 | 9     |
//! | minor    | 47-54 | 8     |
//! | revision | 31-46 | 16    |
//! | build    | 0-30  | 31    |
//!
//! The build field is masked with 31 bits. Older tooling masked it with 24
//! bits, which silently drops the top of large build numbers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::VERSION64_LINE;
use crate::error::{Error, Result};

const MAJOR_SHIFT: u32 = 55;
const MINOR_SHIFT: u32 = 47;
const REVISION_SHIFT: u32 = 31;

const MAJOR_LIMIT: u32 = 1 << 9;
const MINOR_MASK: u64 = 0xFF;
const REVISION_MASK: u64 = 0xFFFF;
const BUILD_MASK: u64 = 0x7FFF_FFFF;

/// Which component of a version to bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionKind {
    Major,
    Minor,
    Revision,
    Build,
}

impl VersionKind {
    /// All kinds, most significant first.
    pub const ALL: [VersionKind; 4] = [
        VersionKind::Major,
        VersionKind::Minor,
        VersionKind::Revision,
        VersionKind::Build,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Revision => "revision",
            Self::Build => "build",
        }
    }
}

impl fmt::Display for VersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "revision" => Ok(Self::Revision),
            "build" => Ok(Self::Build),
            _ => Err(Error::InvalidVersionKind(s.to_string())),
        }
    }
}

/// A BG3 version number (`major.minor.revision.build`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version64 {
    pub major: u32,
    pub minor: u32,
    pub revision: u32,
    pub build: u32,
}

impl Default for Version64 {
    /// `1.0.0.0`, the version new mods start at.
    fn default() -> Self {
        Self::new(1, 0, 0, 0)
    }
}

impl Version64 {
    #[must_use]
    pub const fn new(major: u32, minor: u32, revision: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            revision,
            build,
        }
    }

    /// Unpack a `Version64` integer. Every input is valid.
    #[must_use]
    pub fn from_int64(packed: u64) -> Self {
        Self {
            major: (packed >> MAJOR_SHIFT) as u32,
            minor: ((packed >> MINOR_SHIFT) & MINOR_MASK) as u32,
            revision: ((packed >> REVISION_SHIFT) & REVISION_MASK) as u32,
            build: (packed & BUILD_MASK) as u32,
        }
    }

    /// Pack into a `Version64` integer.
    ///
    /// Fields are not range checked: a field that does not fit its bit width
    /// spills into its neighbours. Use [`Version64::fits`] first when the
    /// value comes from user input.
    #[must_use]
    pub fn to_int64(self) -> u64 {
        (u64::from(self.major) << MAJOR_SHIFT)
            .wrapping_add(u64::from(self.minor) << MINOR_SHIFT)
            .wrapping_add(u64::from(self.revision) << REVISION_SHIFT)
            .wrapping_add(u64::from(self.build))
    }

    /// Whether every field is within its bit width.
    #[must_use]
    pub fn fits(&self) -> bool {
        self.major < MAJOR_LIMIT
            && u64::from(self.minor) <= MINOR_MASK
            && u64::from(self.revision) <= REVISION_MASK
            && u64::from(self.build) <= BUILD_MASK
    }

    /// The next version for the given kind. Less significant fields reset to 0.
    #[must_use]
    pub fn bump(self, kind: VersionKind) -> Self {
        match kind {
            VersionKind::Major => Self::new(self.major.wrapping_add(1), 0, 0, 0),
            VersionKind::Minor => Self::new(self.major, self.minor.wrapping_add(1), 0, 0),
            VersionKind::Revision => {
                Self::new(self.major, self.minor, self.revision.wrapping_add(1), 0)
            }
            VersionKind::Build => Self::new(
                self.major,
                self.minor,
                self.revision,
                self.build.wrapping_add(1),
            ),
        }
    }

    /// Parse a decimal `Version64` integer.
    pub fn parse_int64(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(Self::from_int64)
            .map_err(|_| Error::InvalidVersion64(s.to_string()))
    }

    /// Parse either form: dotted when the input contains a `.`, packed otherwise.
    pub fn parse_any(s: &str) -> Result<Self> {
        if s.contains('.') {
            s.parse()
        } else {
            Self::parse_int64(s)
        }
    }
}

impl From<u64> for Version64 {
    fn from(packed: u64) -> Self {
        Self::from_int64(packed)
    }
}

impl From<Version64> for u64 {
    fn from(version: Version64) -> Self {
        version.to_int64()
    }
}

impl fmt::Display for Version64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.revision, self.build
        )
    }
}

impl FromStr for Version64 {
    type Err = Error;

    /// Parse `major.minor.revision.build`. Exactly four components, each a
    /// non-negative integer literal.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidVersionFormat(s.to_string());

        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 4 {
            return Err(invalid());
        }

        let mut fields = [0u32; 4];
        for (field, part) in fields.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *field = part.parse().map_err(|_| invalid())?;
        }

        let [major, minor, revision, build] = fields;
        Ok(Self::new(major, minor, revision, build))
    }
}

/// Extract the packed version from a `Version64` attribute line, if the line is one.
#[must_use]
pub fn version64_in_line(line: &str) -> Option<Version64> {
    let caps = VERSION64_LINE.captures(line)?;
    caps.get(1)?.as_str().parse::<u64>().ok().map(Version64::from_int64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1_0_0_0: u64 = 36028797018963968;

    #[test]
    fn test_decode_known_value() {
        let version = Version64::from_int64(V1_0_0_0);
        assert_eq!(version, Version64::new(1, 0, 0, 0));
        assert_eq!(version.to_string(), "1.0.0.0");
    }

    #[test]
    fn test_round_trip_at_field_bounds() {
        let samples = [
            Version64::new(0, 0, 0, 0),
            Version64::new(511, 255, 65535, 0x7FFF_FFFF),
            Version64::new(1, 2, 3, 4),
            Version64::new(4, 7, 1, 3),
            Version64::new(0, 0, 0, 0x0100_0000),
        ];
        for v in samples {
            assert!(v.fits());
            assert_eq!(Version64::from_int64(v.to_int64()), v);
            assert_eq!(v.to_string().parse::<Version64>().unwrap(), v);
        }
    }

    #[test]
    fn test_build_uses_31_bit_mask() {
        // 24-bit masking would lose bit 24
        let v = Version64::new(1, 0, 0, 0x0100_0001);
        assert_eq!(Version64::from_int64(v.to_int64()).build, 0x0100_0001);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["1.0.0", "1.0.0.0.0", "1.a.0.0", "1..0.0", "-1.0.0.0", "+1.0.0.0", ""] {
            assert!(
                matches!(bad.parse::<Version64>(), Err(Error::InvalidVersionFormat(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_bump_resets_lower_fields() {
        let v = Version64::new(2, 3, 4, 5);
        assert_eq!(v.bump(VersionKind::Major), Version64::new(3, 0, 0, 0));
        assert_eq!(v.bump(VersionKind::Minor), Version64::new(2, 4, 0, 0));
        assert_eq!(v.bump(VersionKind::Revision), Version64::new(2, 3, 5, 0));
        assert_eq!(v.bump(VersionKind::Build), Version64::new(2, 3, 4, 6));
        // original untouched
        assert_eq!(v, Version64::new(2, 3, 4, 5));
    }

    #[test]
    fn test_bump_build_is_plus_one() {
        let v = Version64::from_int64(V1_0_0_0 + 41);
        assert_eq!(v.bump(VersionKind::Build).to_int64(), v.to_int64() + 1);
    }

    #[test]
    fn test_bump_minor_from_1_0_0_0() {
        let bumped = Version64::from_int64(V1_0_0_0).bump(VersionKind::Minor);
        assert_eq!(bumped.to_string(), "1.1.0.0");
        assert_eq!(bumped.to_int64(), 36169534507319296);
    }

    #[test]
    fn test_out_of_range_field_spills() {
        let v = Version64::new(0, 256, 0, 0);
        assert!(!v.fits());
        assert_eq!(Version64::from_int64(v.to_int64()), Version64::new(1, 0, 0, 0));
    }

    #[test]
    fn test_parse_any() {
        assert_eq!(
            Version64::parse_any("36028797018963968").unwrap(),
            Version64::new(1, 0, 0, 0)
        );
        assert_eq!(Version64::parse_any("1.2.3.4").unwrap(), Version64::new(1, 2, 3, 4));
        assert!(matches!(
            Version64::parse_any("abc"),
            Err(Error::InvalidVersion64(_))
        ));
    }

    #[test]
    fn test_version_kind_from_str() {
        assert_eq!("Minor".parse::<VersionKind>().unwrap(), VersionKind::Minor);
        assert!("patch".parse::<VersionKind>().is_err());
    }

    #[test]
    fn test_version64_in_line() {
        let line = r#"<attribute id="Version64" type="int64" value="36028797018963968"/>"#;
        assert_eq!(version64_in_line(line), Some(Version64::new(1, 0, 0, 0)));
        assert_eq!(version64_in_line("<node id=\"Scripts\"/>"), None);
    }
}
