//! Command execution implementations

use super::Commands;
use super::definitions::{LocaCommands, MetaCommands, VersionCommands};
use super::{check, ids, loca, meta, package, version};
use crate::config::Config;

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        match self {
            Commands::Check { files, format } => check::execute(files, *format, config),
            Commands::Version { command } => command.execute(),
            Commands::Meta { command } => command.execute(),
            Commands::Uuid { count } => ids::uuid(*count),
            Commands::Handle {
                count,
                from_uuid,
                to_uuid,
            } => ids::handle(*count, from_uuid.as_deref(), to_uuid.as_deref()),
            Commands::Package { workspace, dry_run } => {
                package::execute(workspace, *dry_run, config)
            }
            Commands::Loca { command } => command.execute(config),
        }
    }
}

impl VersionCommands {
    /// Execute the selected version command.
    ///
    /// # Errors
    /// Returns an error if the value cannot be parsed or meta.lsx cannot be updated.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            VersionCommands::Convert { value } => version::convert(value),
            VersionCommands::Bump {
                kind,
                workspace,
                dry_run,
            } => version::bump(kind, workspace, *dry_run),
        }
    }
}

impl MetaCommands {
    /// Execute the selected meta.lsx command.
    ///
    /// # Errors
    /// Returns an error if meta.lsx cannot be found or parsed.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            MetaCommands::Info { workspace, json } => meta::info(workspace, *json),
            MetaCommands::Uuid { workspace } => meta::uuid(workspace),
        }
    }
}

impl LocaCommands {
    /// Execute the selected localization command.
    ///
    /// # Errors
    /// Returns an error if the underlying operation fails.
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        match self {
            LocaCommands::Convert { xml, dry_run } => loca::convert(xml, *dry_run, config),
            LocaCommands::Lookup { handle, workspace } => loca::lookup(handle, workspace),
        }
    }
}
