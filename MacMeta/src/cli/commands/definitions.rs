//! Subcommand enum definitions for CLI

use clap::Subcommand;
use std::path::PathBuf;

/// Version64 commands
#[derive(Subcommand)]
pub enum VersionCommands {
    /// Convert between dotted (1.0.0.0) and packed (36028797018963968) forms
    Convert {
        /// Dotted or packed version number
        value: String,
    },

    /// Bump the module version in meta.lsx
    Bump {
        /// Which part to bump
        #[arg(value_parser = ["major", "minor", "revision", "build"])]
        kind: String,

        /// Workspace directory containing the mod
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,

        /// Show the new version without writing meta.lsx
        #[arg(long)]
        dry_run: bool,
    },
}

/// meta.lsx commands
#[derive(Subcommand)]
pub enum MetaCommands {
    /// Show module info and dependencies
    Info {
        /// Workspace directory containing the mod
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the module UUID
    Uuid {
        /// Workspace directory containing the mod
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },
}

/// Localization commands
#[derive(Subcommand)]
pub enum LocaCommands {
    /// Convert a localization .xml file to .loca with divine.exe
    Convert {
        /// Localization XML file
        xml: PathBuf,

        /// Print the command line instead of running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Look up the text of a localization handle
    Lookup {
        /// Localization handle (h...g...)
        handle: String,

        /// Workspace directory containing Localization/
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },
}
