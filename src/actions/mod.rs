pub mod newmod;
pub mod submodule;

use anyhow::{Context, Result};
use tracing::info_span;

use crate::command::{Action, ExitStatus, Invocation};
use crate::config::ModConfig;
use crate::gitops::Git;
use crate::module::{ModKind, ModulePaths};
use crate::process::Executor;
use crate::repl::Interact;
use crate::workspace::Layout;

/// Everything an action needs besides its argument and the console.
pub struct Session<'a> {
    pub config: &'a ModConfig,
    pub layout: &'a Layout,
    pub executor: &'a dyn Executor,
    pub dry_run: bool,
    /// Answer for the kind prompt of `newmod`, when given on the command line.
    pub preset_kind: Option<ModKind>,
}

impl Session<'_> {
    pub fn module(&self, arg: &str) -> ModulePaths {
        ModulePaths::new(self.layout, self.config, arg)
    }

    pub fn root_git(&self) -> Git<'_> {
        Git::new(&self.config.tools.git, self.layout.root_dir.clone(), self.executor)
    }
}

pub fn dispatch(
    session: &Session<'_>,
    invocation: &Invocation,
    io: &mut dyn Interact,
) -> Result<ExitStatus> {
    let Invocation { action, argument } = invocation;
    let _span = info_span!("action", %action, module = %argument).entered();
    let result = match action {
        Action::NewMod => newmod::run(session, argument, io),
        Action::ToSubmod => submodule::split(session, argument, io),
        Action::AddSubmod => submodule::add(session, argument),
        Action::RemoveSubmod => submodule::remove(session, argument),
        Action::Exit => Ok(ExitStatus::Exit),
    };
    result.with_context(|| format!("{action}:{argument}"))
}
