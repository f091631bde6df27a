use anyhow::{Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use crate::config::HostingConfig;
use crate::process::{CommandOutput, Executor, format_command};

/// Thin wrapper over the `git` CLI bound to one working directory.
pub struct Git<'a> {
    program: &'a str,
    dir: Utf8PathBuf,
    executor: &'a dyn Executor,
}

impl<'a> Git<'a> {
    pub fn new(program: &'a str, dir: impl Into<Utf8PathBuf>, executor: &'a dyn Executor) -> Self {
        Self {
            program,
            dir: dir.into(),
            executor,
        }
    }

    pub fn init(&self) -> Result<CommandOutput> {
        self.run(&["init"])
    }

    pub fn add_all(&self) -> Result<CommandOutput> {
        self.run(&["add", "-A"])
    }

    pub fn commit(&self, message: &str) -> Result<CommandOutput> {
        self.run(&["commit", "-m", message])
    }

    /// Like [`Git::commit`], but a clean tree left by an earlier run is fine.
    pub fn commit_pending(&self, message: &str) -> Result<CommandOutput> {
        let args = ["commit", "-m", message];
        let output = self.try_run(&args)?;
        if output.success() {
            return Ok(output);
        }
        if output.diagnostic().contains("nothing to commit") {
            debug!(dir = %self.dir, "nothing to commit");
            return Ok(output);
        }
        Err(self.failure(&args, &output))
    }

    pub fn status(&self) -> Result<CommandOutput> {
        self.run(&["status"])
    }

    /// Point `origin` at `url`, adding the remote when it is missing.
    pub fn set_origin(&self, url: &str) -> Result<CommandOutput> {
        let args = ["remote", "add", "origin", url];
        let output = self.try_run(&args)?;
        if output.success() {
            return Ok(output);
        }
        if output.diagnostic().contains("already exists") {
            return self.run(&["remote", "set-url", "origin", url]);
        }
        Err(self.failure(&args, &output))
    }

    pub fn push(&self, set_upstream: bool) -> Result<CommandOutput> {
        if set_upstream {
            self.run(&["push", "--set-upstream", "origin", "HEAD"])
        } else {
            self.run(&["push"])
        }
    }

    pub fn submodule_add(&self, url: &str, path: &str) -> Result<CommandOutput> {
        self.run(&["submodule", "add", url, path])
    }

    pub fn rm(&self, path: &str) -> Result<CommandOutput> {
        self.run(&["rm", path])
    }

    pub fn try_config_remove_section(&self, section: &str) -> Result<CommandOutput> {
        self.try_run(&["config", "--remove-section", section])
    }

    /// Run and return the output whatever the exit code.
    pub fn try_run(&self, args: &[&str]) -> Result<CommandOutput> {
        let argv = self.argv(args);
        self.executor.run(&self.dir, &argv)
    }

    /// Run and fail on a non-zero exit code.
    pub fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.try_run(args)?;
        if !output.success() {
            return Err(self.failure(args, &output));
        }
        Ok(output)
    }

    fn failure(&self, args: &[&str], output: &CommandOutput) -> anyhow::Error {
        anyhow!(
            "`{}` failed with exit code {:?}: {}",
            format_command(&self.argv(args)),
            output.code,
            output.diagnostic()
        )
    }

    fn argv(&self, args: &[&str]) -> Vec<String> {
        std::iter::once(self.program)
            .chain(args.iter().copied())
            .map(str::to_owned)
            .collect()
    }
}

/// Create the hosted repository for a split-out module. An existing
/// repository is not an error; the split can be re-run.
pub fn create_remote_repo(
    hosting: &HostingConfig,
    executor: &dyn Executor,
    cwd: &Utf8Path,
    name: &str,
) -> Result<CommandOutput> {
    let argv = vec![
        hosting.program.clone(),
        "repo".to_owned(),
        "create".to_owned(),
        name.to_owned(),
        format!("--{}", hosting.visibility),
    ];
    let output = executor.run(cwd, &argv)?;
    if !output.success() {
        warn!(
            repo = name,
            "`{}` exited with {:?}: {}; continuing",
            format_command(&argv),
            output.code,
            output.diagnostic()
        );
    }
    Ok(output)
}
