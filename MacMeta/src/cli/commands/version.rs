//! CLI commands for Version64 numbers

use std::path::Path;

use crate::cli::output::{DISK, print_dry_run, print_status, print_success};
use crate::formats::{Version64, VersionKind};
use crate::mods::{find_meta_lsx, read_meta_lsx, write_meta_lsx};

/// Convert a version number between dotted and packed form
pub fn convert(value: &str) -> anyhow::Result<()> {
    let version = Version64::parse_any(value)?;

    if value.contains('.') {
        if !version.fits() {
            anyhow::bail!("{version} does not fit in a Version64 number");
        }
        println!("{}", version.to_int64());
    } else {
        println!("{version}");
    }
    Ok(())
}

/// Bump the ModuleInfo version in the workspace's meta.lsx
pub fn bump(kind: &str, workspace: &Path, dry_run: bool) -> anyhow::Result<()> {
    let kind: VersionKind = kind.parse()?;
    let path = find_meta_lsx(workspace)?;
    let mut meta = read_meta_lsx(&path)?;

    let previous = meta.version()?;
    let bumped = meta.bump_version(kind)?;

    if dry_run {
        print_dry_run(&format!("{} would change {previous} -> {bumped}", path.display()));
        return Ok(());
    }

    print_status(&DISK, &format!("Writing {}", path.display()));
    write_meta_lsx(&path, &meta)?;
    print_success(&format!("Version bumped to {bumped} ({})", bumped.to_int64()));
    Ok(())
}
