use std::io::{self, BufRead, Stdout, Write};

use anyhow::{Context, Result};
use tracing::debug;

use crate::actions::{self, Session};
use crate::command::{self, ExitStatus};

/// Line-oriented conversation with the user.
pub trait Interact {
    /// Show `label` and read one line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>>;
    fn say(&mut self, message: &str) -> Result<()>;
}

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R, W> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl Console<io::StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Interact for Console<R, W> {
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label).with_context(|| format!("writing prompt `{label}`"))?;
        self.output.flush().context("flushing prompt")?;
        let mut buf = String::new();
        let read = self
            .input
            .read_line(&mut buf)
            .with_context(|| format!("reading input for `{label}`"))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim_end_matches(['\n', '\r']).to_owned()))
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message).context("writing to console")
    }
}

/// Interactive loop: errors are reported and the loop keeps going until
/// `exit:` or end of input.
pub fn run_loop(session: &Session<'_>, io: &mut dyn Interact) -> Result<()> {
    io.say(&format!(
        "Hello {} ({})",
        session.layout.tree_name(),
        session.layout.tree_dir
    ))?;

    loop {
        let Some(line) = io.prompt("> ")? else {
            debug!("end of input");
            io.say("exiting")?;
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let outcome = match command::parse_line(&line) {
            Ok(invocation) => actions::dispatch(session, &invocation, io),
            Err(err) => Err(err),
        };
        match outcome {
            Ok(ExitStatus::Continue) => {}
            Ok(ExitStatus::Exit) => {
                io.say("exiting")?;
                return Ok(());
            }
            Err(err) => io.say(&format!("error: {err:#}"))?,
        }
    }
}

/// Run `lines` in order, stopping at the first failure.
pub fn run_batch(session: &Session<'_>, lines: &[String], io: &mut dyn Interact) -> Result<()> {
    for line in lines {
        let invocation = command::parse_line(line).with_context(|| line.clone())?;
        if actions::dispatch(session, &invocation, io)? == ExitStatus::Exit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
impl Console<io::Cursor<Vec<u8>>, Vec<u8>> {
    pub fn scripted(input: &str) -> Self {
        Self::new(io::Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    pub fn transcript(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::actions::tests::Fixture;

    #[test]
    fn prompt_strips_line_endings_and_reports_eof() {
        let mut console = Console::scripted("abc\r\n");
        assert_eq!(console.prompt("? ").unwrap().as_deref(), Some("abc"));
        assert_eq!(console.prompt("? ").unwrap(), None);
        assert_eq!(console.transcript(), "? ? ");
    }

    #[test]
    fn loop_reports_errors_and_continues_until_exit() {
        let fixture = Fixture::new("");
        let mut io = Console::scripted("bogus\n\nnewmod:gui\n2\nexit:\naddsubmod:never\n");
        run_loop(&fixture.session(), &mut io).unwrap();

        let transcript = io.transcript();
        assert!(transcript.starts_with("Hello KJ ("));
        assert!(transcript.contains("error: commands should be separated by \":\""));
        assert!(transcript.contains("created applib module gui"));
        assert!(transcript.trim_end().ends_with("exiting"));
        assert!(fixture.tree().join("gui").join("modtype.txt").exists());
        assert!(fixture.executor.command_lines().is_empty());
    }

    #[test]
    fn loop_keeps_going_after_action_failure() {
        let fixture = Fixture::new("");
        fs::create_dir_all(fixture.tree().join("gui")).unwrap();
        let mut io = Console::scripted("newmod:gui\naddsubmod:gui\n");
        run_loop(&fixture.session(), &mut io).unwrap();

        assert!(io.transcript().contains("error: newmod:gui: gui already exists"));
        assert_eq!(
            fixture.executor.command_lines(),
            vec!["git submodule add https://github.com/someone/gui KJ/gui"]
        );
    }

    #[test]
    fn batch_stops_at_first_error() {
        let fixture = Fixture::new("");
        let lines = vec!["addsubmod:a".to_owned(), "nope:b".to_owned(), "addsubmod:c".to_owned()];
        let mut io = Console::scripted("");
        let err = run_batch(&fixture.session(), &lines, &mut io).unwrap_err();
        assert_eq!(err.to_string(), "nope:b");
        assert!(format!("{err:#}").contains("possible commands"));
        assert_eq!(fixture.executor.command_lines().len(), 1);
    }

    #[test]
    fn batch_stops_at_exit() {
        let fixture = Fixture::new("");
        let lines = vec!["exit:".to_owned(), "addsubmod:c".to_owned()];
        let mut io = Console::scripted("");
        run_batch(&fixture.session(), &lines, &mut io).unwrap();
        assert!(fixture.executor.command_lines().is_empty());
    }
}
