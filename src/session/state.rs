//! Session state machine and per-line classification.

use crate::engine::EngineError;

/// Typing this (any case) ends the session.
pub const EXIT_COMMAND: &str = "exit";

/// States of the console session.
///
/// ```text
/// Prompting ──"exit" / end of input──▶ Exiting
/// Prompting ──anything else──────────▶ Prompting
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Waiting for the next line of input.
    #[default]
    Prompting,
    /// Terminal.  No further input is read.
    Exiting,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Exiting)
    }
}

/// What one input line asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Exit,
    /// Empty or whitespace-only.
    Empty,
    Speak(&'a str),
}

impl<'a> Command<'a> {
    /// Classify a line that has already had its line ending removed.
    ///
    /// The exit check compares the whole line, so `" exit"` is spoken
    /// rather than treated as the command.
    pub fn classify(line: &'a str) -> Self {
        if line.to_lowercase() == EXIT_COMMAND {
            Command::Exit
        } else if line.trim().is_empty() {
            Command::Empty
        } else {
            Command::Speak(line)
        }
    }
}

/// Result of handling one line.
#[derive(Debug)]
pub enum Outcome {
    Exit,
    Empty,
    Spoken,
    /// The engine failed; the session keeps prompting.
    Failed(EngineError),
}

/// Counters reported when the session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub spoken: usize,
    pub failed: usize,
    pub empty: usize,
}

/// Strip a trailing `\n` or `\r\n`, nothing else.
pub fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_in_any_case() {
        for line in ["exit", "EXIT", "Exit", "eXiT"] {
            assert_eq!(Command::classify(line), Command::Exit, "{line:?}");
        }
    }

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(Command::classify(""), Command::Empty);
        assert_eq!(Command::classify("   "), Command::Empty);
        assert_eq!(Command::classify("\t "), Command::Empty);
    }

    #[test]
    fn padded_exit_is_spoken() {
        assert_eq!(Command::classify(" exit "), Command::Speak(" exit "));
    }

    #[test]
    fn text_is_spoken_verbatim() {
        assert_eq!(
            Command::classify("  hello world"),
            Command::Speak("  hello world")
        );
    }

    #[test]
    fn strips_only_line_endings() {
        assert_eq!(strip_line_ending("hello\n"), "hello");
        assert_eq!(strip_line_ending("hello\r\n"), "hello");
        assert_eq!(strip_line_ending("  hello  "), "  hello  ");
        assert_eq!(strip_line_ending(""), "");
    }

    #[test]
    fn default_state_is_prompting() {
        assert_eq!(SessionState::default(), SessionState::Prompting);
        assert!(!SessionState::Prompting.is_terminal());
        assert!(SessionState::Exiting.is_terminal());
    }
}
