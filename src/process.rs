use std::process::{Command as ProcessCommand, Stdio};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use camino::Utf8Path;
use tracing::{debug, info};

/// Captured result of an external command.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stderr if present, otherwise stdout; trimmed for log lines.
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Runs a command line in a working directory and reports its output.
pub trait Executor {
    fn run(&self, cwd: &Utf8Path, argv: &[String]) -> Result<CommandOutput>;
}

/// Spawns real processes; with `dry_run` it only logs what it would run.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemExecutor {
    pub dry_run: bool,
}

impl SystemExecutor {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

impl Executor for SystemExecutor {
    fn run(&self, cwd: &Utf8Path, argv: &[String]) -> Result<CommandOutput> {
        if argv.is_empty() {
            bail!("invalid command: empty argv");
        }
        let render = format_command(argv);
        if self.dry_run {
            info!(%cwd, "(dry-run) {}", render);
            return Ok(CommandOutput::ok());
        }

        info!(%cwd, "{}", render);
        let start = Instant::now();
        let output = ProcessCommand::new(&argv[0])
            .args(&argv[1..])
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("executing `{}` in {}", render, cwd))?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            code = ?result.code,
            elapsed = ?start.elapsed(),
            stdout = %result.stdout.trim(),
            stderr = %result.stderr.trim(),
            "finished `{}`",
            render
        );
        Ok(result)
    }
}

pub fn format_command(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| {
            if arg.is_empty() || arg.chars().any(|c| c.is_whitespace()) {
                let escaped = arg.replace('"', "\\\"");
                format!("\"{}\"", escaped)
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}


#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| (*item).to_owned()).collect()
    }

    #[test]
    fn format_command_quotes_whitespace() {
        let rendered = format_command(&argv(&["git", "commit", "-m", "first commit"]));
        assert_eq!(rendered, "git commit -m \"first commit\"");
    }

    #[test]
    fn dry_run_does_not_spawn() {
        let executor = SystemExecutor::new(true);
        let output = executor
            .run(Utf8Path::new("/definitely/not/here"), &argv(&["no-such-binary-xyz"]))
            .unwrap();
        assert!(output.success());
    }

    #[test]
    fn missing_program_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let cwd = Utf8Path::from_path(tmp.path()).unwrap();
        let err = SystemExecutor::new(false)
            .run(cwd, &argv(&["no-such-binary-xyz"]))
            .unwrap_err();
        assert!(err.to_string().contains("no-such-binary-xyz"));
    }

    #[test]
    fn empty_argv_is_rejected() {
        assert!(SystemExecutor::new(false).run(Utf8Path::new("."), &[]).is_err());
    }

    #[test]
    fn diagnostic_prefers_stderr() {
        let output = CommandOutput {
            code: Some(1),
            stdout: "out\n".to_owned(),
            stderr: " fatal: nope \n".to_owned(),
        };
        assert_eq!(output.diagnostic(), "fatal: nope");
        assert_eq!(CommandOutput::ok().diagnostic(), "");
    }
}
