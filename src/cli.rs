use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::module::ModKind;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "modkit",
    version,
    about = "Scaffold monorepo modules and split them into git submodules"
)]
pub struct Cli {
    #[arg(short = 'C', long = "chdir", global = true)]
    pub chdir: Option<PathBuf>,
    /// Config file to use instead of the discovered `.modkit/config.toml`.
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<PathBuf>,
    /// Module tree directory; skips the upward search.
    #[arg(long = "root", global = true)]
    pub root: Option<PathBuf>,
    #[arg(short = 'n', long = "dry-run", global = true)]
    pub dry_run: bool,
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Kind for `newmod` instead of prompting.
    #[arg(long = "kind", value_enum, global = true)]
    pub kind: Option<ModKind>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive `action:argument` prompt (the default).
    Shell,
    /// Run the given `action:argument` lines and exit.
    Exec {
        #[arg(required = true)]
        lines: Vec<String>,
    },
    /// Configuration display, editing, and template generation.
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommand>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Show,
    Path,
    Generate {
        #[arg()]
        path: Option<PathBuf>,
        #[arg(long = "force", default_value_t = false)]
        force: bool,
    },
    /// Set one key, e.g. `hosting.visibility public`.
    Set { key: String, value: String },
}

/// Helper entry point so `main` can stay minimal.
pub fn parse() -> Cli {
    Cli::parse()
}
