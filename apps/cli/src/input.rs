//! Line-oriented input: commands, continued lines, and commits.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(PathBuf),
    Health,
    Dismiss,
    Transcript,
    Help,
    Quit,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    Command(Command),
    /// Trailing backslash: keep composing on the next line.
    Continue(String),
    Commit(String),
}

/// Commands are only recognized at the start of a fresh draft, so a
/// continued message may contain lines beginning with `/`.
pub fn parse_line(line: &str, draft_is_empty: bool) -> InputLine {
    let line = line.trim_end_matches(['\r', '\n']);

    if draft_is_empty {
        if let Some(command) = line.trim().strip_prefix('/') {
            return InputLine::Command(parse_command(command));
        }
    }

    match line.strip_suffix('\\') {
        Some(head) => InputLine::Continue(head.to_string()),
        None => InputLine::Commit(line.to_string()),
    }
}

fn parse_command(raw: &str) -> Command {
    let (name, rest) = match raw.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (raw, ""),
    };
    match name {
        "upload" if !rest.is_empty() => Command::Upload(PathBuf::from(rest)),
        "health" => Command::Health,
        "dismiss" => Command::Dismiss,
        "transcript" => Command::Transcript,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(raw.to_string()),
    }
}
