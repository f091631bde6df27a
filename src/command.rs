use std::fmt;
use std::sync::OnceLock;

use anyhow::{Result, bail};
use regex::Regex;

/// Named actions accepted by the command loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    NewMod,
    ToSubmod,
    AddSubmod,
    RemoveSubmod,
    Exit,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::NewMod,
        Action::ToSubmod,
        Action::AddSubmod,
        Action::RemoveSubmod,
        Action::Exit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::NewMod => "newmod",
            Action::ToSubmod => "tosubmod",
            Action::AddSubmod => "addsubmod",
            Action::RemoveSubmod => "removesubmod",
            Action::Exit => "exit",
        }
    }

    pub fn from_name(name: &str) -> Option<Action> {
        Self::ALL.into_iter().find(|action| action.as_str() == name)
    }

    fn takes_module(&self) -> bool {
        !matches!(self, Action::Exit)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the loop does after an action returns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExitStatus {
    Continue,
    Exit,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    pub action: Action,
    pub argument: String,
}

fn module_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*(\.[A-Za-z_][A-Za-z0-9_-]*)*$")
            .expect("module name pattern compiles")
    })
}

pub fn is_module_name(value: &str) -> bool {
    module_name_pattern().is_match(value)
}

/// Parse `action:argument`.
pub fn parse_line(line: &str) -> Result<Invocation> {
    let line = line.trim();
    if line.chars().any(char::is_whitespace) || !line.contains(':') {
        bail!("commands should be separated by \":\"");
    }

    let parts: Vec<&str> = line.split(':').collect();
    let Some(action) = Action::from_name(parts[0]) else {
        let names: Vec<&str> = Action::ALL.iter().map(Action::as_str).collect();
        bail!("possible commands: [{}]", names.join(", "));
    };
    if parts.len() != 2 {
        bail!("please specify a module name");
    }

    let argument = parts[1];
    if action.takes_module() && !is_module_name(argument) {
        bail!("invalid module name `{}` (expected dotted segments like `gui.fx`)", argument);
    }

    Ok(Invocation {
        action,
        argument: argument.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_action() {
        for action in Action::ALL {
            let parsed = parse_line(&format!("{action}:gui.fx\n")).unwrap();
            assert_eq!(parsed.action, action);
            assert_eq!(parsed.argument, "gui.fx");
        }
    }

    #[test]
    fn exit_accepts_empty_argument() {
        let parsed = parse_line("exit:").unwrap();
        assert_eq!(parsed.action, Action::Exit);
        assert_eq!(parsed.argument, "");
    }

    #[test]
    fn exit_ignores_its_argument() {
        for line in ["exit:now", "exit:9lives", "exit:a/b..c"] {
            let parsed = parse_line(line).unwrap();
            assert_eq!(parsed.action, Action::Exit, "{line}");
        }
        assert_eq!(parse_line("exit:bye").unwrap().argument, "bye");
    }

    #[test]
    fn rejects_missing_separator_and_whitespace() {
        for line in ["newmod", "newmod gui", "newmod: gui", "exit"] {
            let err = parse_line(line).unwrap_err();
            assert_eq!(err.to_string(), "commands should be separated by \":\"", "{line}");
        }
    }

    #[test]
    fn rejects_unknown_action_with_listing() {
        let err = parse_line("mkmod:gui").unwrap_err();
        assert_eq!(
            err.to_string(),
            "possible commands: [newmod, tosubmod, addsubmod, removesubmod, exit]"
        );
    }

    #[test]
    fn rejects_extra_separators() {
        let err = parse_line("newmod:gui:fx").unwrap_err();
        assert_eq!(err.to_string(), "please specify a module name");
    }

    #[test]
    fn rejects_malformed_module_names() {
        let lines = [
            "newmod:",
            "newmod:gui..fx",
            "newmod:.gui",
            "newmod:gui/fx",
            "addsubmod:9lives",
        ];
        for line in lines {
            assert!(parse_line(line).is_err(), "{line}");
        }
        assert!(is_module_name("kjlib.lang"));
        assert!(is_module_name("web-app"));
    }
}
