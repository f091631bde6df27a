use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use camino::Utf8PathBuf;
use tracing::debug;

use crate::actions::Session;
use crate::cli::{Cli, Command, ConfigCommand};
use crate::config::{self, ModConfig, ResolvedConfigPath};
use crate::module::ModKind;
use crate::process::SystemExecutor;
use crate::repl::{self, Console};
use crate::workspace::{self, Layout};

pub fn run(cli: Cli) -> Result<()> {
    let ctx = CliContext::from(&cli);
    ctx.apply_chdir()?;

    match cli.command {
        Some(Command::Config { command }) => handle_config(&ctx, command),
        Some(Command::Exec { lines }) => {
            let state = AppState::new(&ctx)?;
            let mut io = Console::stdio();
            repl::run_batch(&state.session(), &lines, &mut io)
        }
        Some(Command::Shell) | None => {
            let state = AppState::new(&ctx)?;
            let mut io = Console::stdio();
            repl::run_loop(&state.session(), &mut io)
        }
    }
}

fn handle_config(ctx: &CliContext, command: Option<ConfigCommand>) -> Result<()> {
    let resolved = ctx.resolve_config_path()?;
    let config_path = resolved.path;
    match command {
        Some(ConfigCommand::Path) => {
            println!("Config path: {} ({})", config_path, resolved.source.as_str());
            Ok(())
        }
        None | Some(ConfigCommand::Show) => {
            if !config_path.exists() {
                println!("No config found at {}; using defaults.", config_path);
                println!("Use `modkit config generate` to scaffold one.");
            } else {
                println!("Config path: {} ({})", config_path, resolved.source.as_str());
            }
            let config = config::load_or_default(&config_path)?;
            println!("{}", config::format_summary(&config));
            Ok(())
        }
        Some(ConfigCommand::Generate { path, force }) => {
            let target = match path {
                Some(path) => utf8(path, "config generate path")?,
                None => config_path,
            };
            config::write_example_config(&target, force)?;
            if force {
                println!("Overwrote config at {}", target);
            } else {
                println!("Wrote example config to {}", target);
            }
            Ok(())
        }
        Some(ConfigCommand::Set { key, value }) => {
            config::set_value(&config_path, &key, &value)?;
            println!("Set `{}` = {} in {}", key, value, config_path);
            Ok(())
        }
    }
}

fn utf8(path: PathBuf, what: &str) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).map_err(|_| anyhow!("{what} must be valid UTF-8"))
}

#[derive(Clone, Debug)]
struct CliContext {
    chdir: Option<PathBuf>,
    file: Option<PathBuf>,
    root: Option<PathBuf>,
    dry_run: bool,
    kind: Option<ModKind>,
}

impl CliContext {
    fn apply_chdir(&self) -> Result<()> {
        if let Some(path) = &self.chdir {
            std::env::set_current_dir(path)
                .with_context(|| format!("changing directory to {}", path.display()))?;
        }
        Ok(())
    }

    fn resolve_config_path(&self) -> Result<ResolvedConfigPath> {
        let explicit = self
            .file
            .clone()
            .map(|path| utf8(path, "config path"))
            .transpose()?;
        let cwd = workspace::current_dir()?;
        config::resolve_path(explicit.as_deref(), &cwd)
    }
}

impl From<&Cli> for CliContext {
    fn from(cli: &Cli) -> Self {
        Self {
            chdir: cli.chdir.clone(),
            file: cli.file.clone(),
            root: cli.root.clone(),
            dry_run: cli.dry_run,
            kind: cli.kind,
        }
    }
}

/// Loaded config, located module tree, and the executor actions run through.
struct AppState {
    config: ModConfig,
    layout: Layout,
    executor: SystemExecutor,
    dry_run: bool,
    kind: Option<ModKind>,
}

impl AppState {
    fn new(ctx: &CliContext) -> Result<Self> {
        let resolved = ctx.resolve_config_path()?;
        let config = config::load_or_default(&resolved.path)?;
        debug!(path = %resolved.path, source = resolved.source.as_str(), "config resolved");

        let cwd = workspace::current_dir()?;
        let root = ctx
            .root
            .clone()
            .map(|path| utf8(path, "--root"))
            .transpose()?;
        let layout = Layout::discover(root.as_deref(), &config, &cwd)?;
        debug!(tree = %layout.tree_dir, root = %layout.root_dir, "workspace located");

        Ok(Self {
            config,
            layout,
            executor: SystemExecutor::new(ctx.dry_run),
            dry_run: ctx.dry_run,
            kind: ctx.kind,
        })
    }

    fn session(&self) -> Session<'_> {
        Session {
            config: &self.config,
            layout: &self.layout,
            executor: &self.executor,
            dry_run: self.dry_run,
            preset_kind: self.kind,
        }
    }
}
