//! CLI commands for inspecting meta.lsx

use std::path::Path;

use console::style;
use serde_json::json;

use crate::mods::{DependencyField, find_meta_lsx, read_meta_lsx};

/// Print module info and dependencies
pub fn info(workspace: &Path, as_json: bool) -> anyhow::Result<()> {
    let path = find_meta_lsx(workspace)?;
    let meta = read_meta_lsx(&path)?;

    if as_json {
        let report = json!({
            "path": path.display().to_string(),
            "moduleInfo": meta.module_info(),
            "dependencies": meta.dependencies(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", style(path.display()).bold());
    println!("\nModuleInfo:");
    for (field, value) in &meta.module_info().attributes {
        println!("  {:<28} {value}", style(field).cyan());
    }
    if let Ok(version) = meta.version() {
        println!("  {:<28} {version}", style("(version)").dim());
    }

    if meta.dependencies().is_empty() {
        println!("\nNo dependencies");
    } else {
        println!("\nDependencies:");
        for dependency in meta.dependencies() {
            let name = dependency.get(DependencyField::Name).unwrap_or("?");
            let uuid = dependency.get(DependencyField::UUID).unwrap_or("?");
            println!("  - {name} ({uuid})");
        }
    }
    Ok(())
}

/// Print the module UUID
pub fn uuid(workspace: &Path) -> anyhow::Result<()> {
    let meta = read_meta_lsx(find_meta_lsx(workspace)?)?;
    println!("{}", meta.uuid()?);
    Ok(())
}
