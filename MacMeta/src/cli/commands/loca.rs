//! CLI commands for localization files

use std::path::Path;

use crate::cli::output::{LOOKING_GLASS, print_dry_run, print_status, print_success};
use crate::config::Config;
use crate::mods::{LocalizationReference, find_localization_files, loca_destination};

/// Convert a localization XML file to `.loca` next to it
pub fn convert(xml: &Path, dry_run: bool, config: &Config) -> anyhow::Result<()> {
    if !xml.is_file() {
        anyhow::bail!("{} is not a file", xml.display());
    }
    let destination = loca_destination(xml)?;

    let divine = config.divine();
    let args = divine.convert_loca_args(xml, &destination);

    if dry_run {
        print_dry_run(&divine.command_line(&args));
        return Ok(());
    }

    divine.run(&args)?;
    print_success(&format!("Wrote {}", destination.display()));
    Ok(())
}

/// Print the text of a localization handle
///
/// Exits with status 1 when no localization file defines the handle.
pub fn lookup(handle: &str, workspace: &Path) -> anyhow::Result<()> {
    let files = find_localization_files(workspace);
    print_status(
        &LOOKING_GLASS,
        &format!("Searching {} localization file(s)", files.len()),
    );

    let reference = LocalizationReference::from_files(&files)?;
    match reference.get(handle.trim()) {
        Some(text) => {
            println!("{text}");
            Ok(())
        }
        None => {
            eprintln!("Handle {handle} not found");
            std::process::exit(1);
        }
    }
}
