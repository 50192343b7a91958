//! Command lines for the LSLib packaging tool (`divine.exe`)

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Default executable name, resolved through `PATH`.
pub const DEFAULT_DIVINE: &str = "divine.exe";

/// Games the packaging tool accepts for `--game`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    Dos,
    Dosee,
    Dos2,
    Dos2de,
    #[default]
    Bg3,
}

impl Game {
    pub const ALL: [Self; 5] = [Self::Dos, Self::Dosee, Self::Dos2, Self::Dos2de, Self::Bg3];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dos => "dos",
            Self::Dosee => "dosee",
            Self::Dos2 => "dos2",
            Self::Dos2de => "dos2de",
            Self::Bg3 => "bg3",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Game {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|game| game.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidGame(s.to_string()))
    }
}

/// Packaging tool action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreatePackage,
    ConvertLoca,
}

impl Action {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatePackage => "create-package",
            Self::ConvertLoca => "convert-loca",
        }
    }
}

/// The packaging tool and the game it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divine {
    pub path: PathBuf,
    pub game: Game,
}

impl Default for Divine {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DIVINE),
            game: Game::default(),
        }
    }
}

impl Divine {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, game: Game) -> Self {
        Self {
            path: path.into(),
            game,
        }
    }

    /// `--game <game> --action <action> --source <source> --destination <destination>`
    #[must_use]
    pub fn args(&self, action: Action, source: &Path, destination: &Path) -> Vec<String> {
        vec![
            "--game".to_string(),
            self.game.to_string(),
            "--action".to_string(),
            action.as_str().to_string(),
            "--source".to_string(),
            source.display().to_string(),
            "--destination".to_string(),
            destination.display().to_string(),
        ]
    }

    /// Arguments to pack the mod folder `source` into `destination`.
    #[must_use]
    pub fn create_package_args(&self, source: &Path, destination: &Path) -> Vec<String> {
        self.args(Action::CreatePackage, source, destination)
    }

    /// Arguments to convert a localization XML file to `.loca`.
    #[must_use]
    pub fn convert_loca_args(&self, source: &Path, destination: &Path) -> Vec<String> {
        self.args(Action::ConvertLoca, source, destination)
    }

    /// The full command line as a single space-joined string.
    #[must_use]
    pub fn command_line(&self, args: &[String]) -> String {
        std::iter::once(self.path.display().to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the tool with `args` and wait for it.
    ///
    /// # Errors
    /// Returns [`Error::ToolFailed`] if the tool cannot be started or exits
    /// unsuccessfully.
    pub fn run(&self, args: &[String]) -> Result<()> {
        let tool = self.path.display().to_string();
        info!("running {}", self.command_line(args));

        let status = Command::new(&self.path)
            .args(args)
            .status()
            .map_err(|e| Error::ToolFailed {
                tool: tool.clone(),
                message: e.to_string(),
            })?;

        if !status.success() {
            return Err(Error::ToolFailed {
                tool,
                message: format!("exit code {}", status.code().unwrap_or(-1)),
            });
        }
        Ok(())
    }
}

/// Output package for a mod root: `<parent>/<RootName>.pak`
///
/// # Errors
/// Returns [`Error::InvalidPath`] if `root` has no folder name.
pub fn package_destination(root: &Path) -> Result<PathBuf> {
    let name = root
        .file_name()
        .ok_or_else(|| Error::InvalidPath(root.display().to_string()))?;
    let parent = root.parent().unwrap_or_else(|| Path::new(""));

    let mut file_name = name.to_os_string();
    file_name.push(".pak");
    Ok(parent.join(file_name))
}

/// Output file for a localization XML: `<dir>/<stem>.loca`
///
/// # Errors
/// Returns [`Error::InvalidPath`] if `xml` has no file name.
pub fn loca_destination(xml: &Path) -> Result<PathBuf> {
    if xml.file_stem().is_none() {
        return Err(Error::InvalidPath(xml.display().to_string()));
    }
    Ok(xml.with_extension("loca"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_package_command_line() {
        let divine = Divine::default();
        let args = divine.create_package_args(Path::new("work/MyMod"), Path::new("work/MyMod.pak"));
        assert_eq!(
            divine.command_line(&args),
            "divine.exe --game bg3 --action create-package --source work/MyMod --destination work/MyMod.pak"
        );
    }

    #[test]
    fn test_convert_loca_args() {
        let divine = Divine::new("tools/divine", Game::Dos2de);
        let args = divine.convert_loca_args(Path::new("a.xml"), Path::new("a.loca"));
        assert_eq!(args[1], "dos2de");
        assert_eq!(args[3], "convert-loca");
    }

    #[test]
    fn test_destinations() {
        assert_eq!(
            package_destination(Path::new("work/MyMod")).unwrap(),
            Path::new("work/MyMod.pak")
        );
        assert_eq!(
            loca_destination(Path::new("Localization/English/english.xml")).unwrap(),
            Path::new("Localization/English/english.loca")
        );
        assert!(package_destination(Path::new("/")).is_err());
    }

    #[test]
    fn test_game_parse() {
        assert_eq!("BG3".parse::<Game>().unwrap(), Game::Bg3);
        assert!(matches!("wow".parse::<Game>(), Err(Error::InvalidGame(_))));
    }

    #[test]
    fn test_missing_tool_fails() {
        let divine = Divine::new("definitely-not-a-real-divine-binary", Game::Bg3);
        let err = divine.run(&[]).unwrap_err();
        assert!(matches!(err, Error::ToolFailed { .. }));
    }
}
