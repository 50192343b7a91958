pub mod check;
pub mod definitions;
pub mod execute;
pub mod ids;
pub mod loca;
pub mod meta;
pub mod package;
pub mod version;

use clap::{Subcommand, ValueEnum};
use std::path::PathBuf;

use definitions::{LocaCommands, MetaCommands, VersionCommands};

/// Output format for `check`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per problem
    #[default]
    Text,
    /// Problems per file as JSON
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check XML files against the built-in schemas
    Check {
        /// Files to check (meta.lsx, modsettings.lsx, Localization/**/*.xml)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Version64 number utilities
    Version {
        #[command(subcommand)]
        command: VersionCommands,
    },

    /// Inspect the workspace's meta.lsx
    Meta {
        #[command(subcommand)]
        command: MetaCommands,
    },

    /// Generate random UUIDs
    Uuid {
        /// How many to generate
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },

    /// Generate localization handles, or convert between handles and UUIDs
    Handle {
        /// How many to generate
        #[arg(short = 'n', long, default_value_t = 1, conflicts_with_all = ["from_uuid", "to_uuid"])]
        count: usize,

        /// Convert this UUID to a handle
        #[arg(long, conflicts_with = "to_uuid")]
        from_uuid: Option<String>,

        /// Convert this handle to a UUID
        #[arg(long)]
        to_uuid: Option<String>,
    },

    /// Pack the mod into a .pak with divine.exe
    Package {
        /// Workspace directory containing the mod
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,

        /// Print the command line instead of running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Localization file operations
    Loca {
        #[command(subcommand)]
        command: LocaCommands,
    },
}
