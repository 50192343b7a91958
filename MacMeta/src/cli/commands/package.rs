//! CLI command for packaging a mod

use std::path::Path;

use crate::cli::output::{PACKAGE, print_dry_run, print_status, print_success};
use crate::config::Config;
use crate::mods::{find_meta_lsx, mod_root_folder, package_destination};

/// Pack the workspace's mod into `<parent>/<RootName>.pak`
pub fn execute(workspace: &Path, dry_run: bool, config: &Config) -> anyhow::Result<()> {
    let meta_path = find_meta_lsx(workspace)?.canonicalize()?;
    let root = mod_root_folder(&meta_path)?;
    let destination = package_destination(&root)?;

    let divine = config.divine();
    let args = divine.create_package_args(&root, &destination);

    if dry_run {
        print_dry_run(&divine.command_line(&args));
        return Ok(());
    }

    print_status(&PACKAGE, &format!("Packing {}", root.display()));
    divine.run(&args)?;
    print_success(&format!("Wrote {}", destination.display()));
    Ok(())
}
