//! Locating mod files in a workspace
//!
//! The game expects a mod laid out as
//!
//! ```text
//! [RootFolder]/
//!   Localization/[Language]/*.xml
//!   Mods/[ModFolder]/meta.lsx
//!   Public/[ModFolder]/...
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use super::meta::MetaLsx;
use crate::error::{Error, Result};

/// File name of the mod descriptor.
pub const META_LSX: &str = "meta.lsx";

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn walk(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(std::result::Result::ok)
}

/// Find the `meta.lsx` below `root`
///
/// The walk is sorted by file name, so the same tree always yields the same
/// file. Hidden directories are skipped.
///
/// # Errors
/// Returns [`Error::MetaLsxNotFound`] if there is none.
pub fn find_meta_lsx<P: AsRef<Path>>(root: P) -> Result<PathBuf> {
    let root = root.as_ref();
    let found = walk(root)
        .find(|e| e.file_type().is_file() && e.file_name() == META_LSX)
        .map(DirEntry::into_path);

    match found {
        Some(path) => {
            debug!("found descriptor at {}", path.display());
            Ok(path)
        }
        None => Err(Error::MetaLsxNotFound {
            root: root.to_path_buf(),
        }),
    }
}

/// Read and parse a descriptor file
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_meta_lsx<P: AsRef<Path>>(path: P) -> Result<MetaLsx> {
    let text = fs::read_to_string(path)?;
    MetaLsx::parse(&text)
}

/// Write a descriptor back to disk
///
/// # Errors
/// Returns an error if serialization or writing fails.
pub fn write_meta_lsx<P: AsRef<Path>>(path: P, meta: &MetaLsx) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, meta.to_xml()?)?;
    info!("wrote {}", path.display());
    Ok(())
}

/// The mod's root folder: three levels above `Mods/[ModFolder]/meta.lsx`
///
/// # Errors
/// Returns [`Error::InvalidPath`] if `meta_lsx` is not nested deep enough.
pub fn mod_root_folder<P: AsRef<Path>>(meta_lsx: P) -> Result<PathBuf> {
    let meta_lsx = meta_lsx.as_ref();
    meta_lsx
        .ancestors()
        .nth(3)
        .filter(|root| !root.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::InvalidPath(meta_lsx.display().to_string()))
}

/// Name of the mod's root folder
///
/// # Errors
/// See [`mod_root_folder`].
pub fn mod_root_name<P: AsRef<Path>>(meta_lsx: P) -> Result<String> {
    let root = mod_root_folder(meta_lsx)?;
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::InvalidPath(root.display().to_string()))
}

/// All localization XML files (`**/Localization/**/*.xml`) below `root`, sorted.
#[must_use]
pub fn find_localization_files<P: AsRef<Path>>(root: P) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walk(root.as_ref())
        .filter(|e| e.file_type().is_file() && is_localization_xml(e.path()))
        .map(DirEntry::into_path)
        .collect();

    files.sort();
    files
}

/// Whether `path` is an `.xml` file below a `Localization` folder.
#[must_use]
pub fn is_localization_xml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        && path
            .parent()
            .is_some_and(|dir| dir.components().any(|c| c.as_os_str() == "Localization"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn test_find_meta_lsx() {
        let dir = TempDir::new().unwrap();
        let expected = touch(dir.path(), "MyMod/Mods/MyMod/meta.lsx");
        touch(dir.path(), ".git/meta.lsx");
        touch(dir.path(), "Zzz/Mods/Other/meta.lsx");

        assert_eq!(find_meta_lsx(dir.path()).unwrap(), expected);
    }

    #[test]
    fn test_find_meta_lsx_missing() {
        let dir = TempDir::new().unwrap();
        let err = find_meta_lsx(dir.path()).unwrap_err();
        assert!(matches!(err, Error::MetaLsxNotFound { .. }));
    }

    #[test]
    fn test_mod_root() {
        let meta = Path::new("work/MyMod/Mods/MyMod/meta.lsx");
        assert_eq!(mod_root_folder(meta).unwrap(), Path::new("work/MyMod"));
        assert_eq!(mod_root_name(meta).unwrap(), "MyMod");
        assert!(mod_root_folder("Mods/meta.lsx").is_err());
    }

    #[test]
    fn test_find_localization_files() {
        let dir = TempDir::new().unwrap();
        let english = touch(dir.path(), "MyMod/Localization/English/english.xml");
        let french = touch(dir.path(), "MyMod/Localization/French/french.xml");
        touch(dir.path(), "MyMod/Localization/English/notes.txt");
        touch(dir.path(), "MyMod/Public/english.xml");

        assert_eq!(find_localization_files(dir.path()), vec![english, french]);
    }
}
