use anyhow::Result;
use camino::Utf8Path;
use tracing::{debug, warn};

use crate::config::ToolsConfig;
use crate::process::{Executor, format_command};

fn default_browser() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(windows) {
        "explorer"
    } else {
        "xdg-open"
    }
}

/// Open `path` in the configured editor. Does nothing without one.
pub fn open_in_editor(
    tools: &ToolsConfig,
    executor: &dyn Executor,
    cwd: &Utf8Path,
    path: &Utf8Path,
) -> Result<()> {
    let Some(editor) = tools.editor.as_deref() else {
        debug!(%path, "no editor configured; not opening");
        return Ok(());
    };
    launch(executor, cwd, editor, path.as_str())
}

pub fn browse(
    tools: &ToolsConfig,
    executor: &dyn Executor,
    cwd: &Utf8Path,
    url: &str,
) -> Result<()> {
    let browser = tools.browser.as_deref().unwrap_or(default_browser());
    launch(executor, cwd, browser, url)
}

/// Launchers are best effort: a missing program or a failing launch is
/// logged and swallowed.
fn launch(executor: &dyn Executor, cwd: &Utf8Path, command: &str, target: &str) -> Result<()> {
    let mut argv: Vec<String> = command.split_whitespace().map(str::to_owned).collect();
    let Some(program) = argv.first() else {
        warn!("empty launcher command; not opening {}", target);
        return Ok(());
    };
    if let Err(err) = which::which(program) {
        warn!(program = %program, "launcher not found ({err}); not opening {}", target);
        return Ok(());
    }

    argv.push(target.to_owned());
    let output = executor.run(cwd, &argv)?;
    if !output.success() {
        warn!(
            "`{}` exited with {:?}: {}",
            format_command(&argv),
            output.code,
            output.diagnostic()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::RecordingExecutor;

    #[test]
    fn no_editor_means_no_launch() {
        let executor = RecordingExecutor::default();
        let tools = ToolsConfig::default();
        open_in_editor(&tools, &executor, Utf8Path::new("/"), Utf8Path::new("/x.kt")).unwrap();
        assert!(executor.command_lines().is_empty());
    }

    #[test]
    fn missing_launcher_is_skipped() {
        let executor = RecordingExecutor::default();
        let tools = ToolsConfig {
            browser: Some("no-such-browser-xyz".to_owned()),
            ..ToolsConfig::default()
        };
        browse(&tools, &executor, Utf8Path::new("/"), "https://example.com").unwrap();
        assert!(executor.command_lines().is_empty());
    }

    #[test]
    fn browse_falls_back_to_platform_opener() {
        let executor = RecordingExecutor::default();
        let tools = ToolsConfig::default();
        browse(&tools, &executor, Utf8Path::new("/"), "https://example.com").unwrap();
        for line in executor.command_lines() {
            assert_eq!(line, format!("{} https://example.com", default_browser()));
        }
    }

    #[cfg(unix)]
    #[test]
    fn launcher_arguments_are_kept() {
        let executor = RecordingExecutor::default();
        let tools = ToolsConfig {
            editor: Some("sh -c true".to_owned()),
            ..ToolsConfig::default()
        };
        open_in_editor(&tools, &executor, Utf8Path::new("/"), Utf8Path::new("/x.kt")).unwrap();
        assert_eq!(executor.command_lines(), vec!["sh -c true /x.kt"]);
    }
}
