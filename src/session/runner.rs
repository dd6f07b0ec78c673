//! Interactive prompt loop.

use std::io::{self, BufRead, Write};

use crate::engine::SpeechEngine;
use crate::session::state::{strip_line_ending, Command, Outcome, SessionState, SessionSummary};

pub const PROMPT: &str = "Enter the text you want to listen (or type 'exit' to quit): ";
pub const EMPTY_INPUT_MESSAGE: &str = "Empty input. Please enter some text.";

/// Drives an already-configured [`SpeechEngine`] from line input.
///
/// Engine failures are logged and counted; they never end the session.
/// Only `exit` or end of input does.
#[derive(Debug)]
pub struct SpeechSession<E> {
    engine: E,
    state: SessionState,
    summary: SessionSummary,
}

impl<E: SpeechEngine> SpeechSession<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: SessionState::Prompting,
            summary: SessionSummary::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Handle one line (line ending already removed).
    pub fn handle_line(&mut self, line: &str) -> Outcome {
        match Command::classify(line) {
            Command::Exit => {
                log::info!("Exiting the program.");
                self.state = SessionState::Exiting;
                Outcome::Exit
            }
            Command::Empty => {
                log::warn!("Empty input received. Prompting user again.");
                self.summary.empty += 1;
                Outcome::Empty
            }
            Command::Speak(text) => match self.engine.speak(text) {
                Ok(()) => {
                    log::info!("Text-to-speech conversion successful.");
                    self.summary.spoken += 1;
                    Outcome::Spoken
                }
                Err(e) => {
                    log::error!("Failed to convert text to speech: {e}");
                    self.summary.failed += 1;
                    Outcome::Failed(e)
                }
            },
        }
    }

    /// Prompt on `output`, read from `input`, until `exit` or end of input.
    ///
    /// # Errors
    ///
    /// Only console I/O errors (including non-UTF-8 input) end the loop
    /// with an error.
    pub fn run<R, W>(&mut self, mut input: R, mut output: W) -> io::Result<SessionSummary>
    where
        R: BufRead,
        W: Write,
    {
        let mut line = String::new();

        while !self.state.is_terminal() {
            write!(output, "{PROMPT}")?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                log::info!("End of input. Exiting the program.");
                self.state = SessionState::Exiting;
                break;
            }

            if let Outcome::Empty = self.handle_line(strip_line_ending(&line)) {
                writeln!(output, "{EMPTY_INPUT_MESSAGE}")?;
            }
        }

        log::debug!(
            "Session ended: {} spoken, {} failed, {} empty",
            self.summary.spoken,
            self.summary.failed,
            self.summary.empty
        );
        Ok(self.summary)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::engine::MockEngine;

    fn run_with(engine: MockEngine, input: &str) -> (SpeechSession<MockEngine>, String) {
        let mut session = SpeechSession::new(engine);
        let mut out = Vec::new();
        session
            .run(Cursor::new(input.as_bytes()), &mut out)
            .expect("run");
        (session, String::from_utf8(out).expect("utf-8"))
    }

    #[test]
    fn speaks_lines_until_exit() {
        let (session, out) = run_with(MockEngine::with_voices(2), "hello\nworld\nexit\nignored\n");

        assert_eq!(session.engine().spoken, ["hello", "world"]);
        assert_eq!(session.state(), SessionState::Exiting);
        assert_eq!(out.matches(PROMPT).count(), 3);
    }

    #[test]
    fn exit_is_case_insensitive_and_not_spoken() {
        for cmd in ["exit", "EXIT", "Exit"] {
            let (session, _) = run_with(MockEngine::with_voices(2), &format!("{cmd}\n"));
            assert!(session.engine().spoken.is_empty(), "{cmd}");
            assert_eq!(session.state(), SessionState::Exiting);
        }
    }

    #[test]
    fn empty_input_never_reaches_engine() {
        let (session, out) = run_with(MockEngine::with_voices(2), "\n   \nexit\n");

        assert!(session.engine().spoken.is_empty());
        assert_eq!(out.matches(EMPTY_INPUT_MESSAGE).count(), 2);
        assert_eq!(out.matches(PROMPT).count(), 3);
        assert_eq!(session.summary().empty, 2);
    }

    #[test]
    fn engine_failure_keeps_prompting() {
        let engine = MockEngine::with_voices(2).failing_on("boom");
        let (session, out) = run_with(engine, "boom\nafter\nexit\n");

        assert_eq!(session.engine().spoken, ["after"]);
        assert_eq!(out.matches(PROMPT).count(), 3);
        assert_eq!(
            session.summary(),
            SessionSummary {
                spoken: 1,
                failed: 1,
                empty: 0
            }
        );
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let (session, out) = run_with(MockEngine::with_voices(2), "last line");

        assert_eq!(session.engine().spoken, ["last line"]);
        assert_eq!(session.state(), SessionState::Exiting);
        assert_eq!(out.matches(PROMPT).count(), 2);
    }

    #[test]
    fn crlf_line_endings_are_stripped() {
        let (session, _) = run_with(MockEngine::with_voices(2), "hi there\r\nEXIT\r\n");
        assert_eq!(session.engine().spoken, ["hi there"]);
    }

    #[test]
    fn handle_line_reports_failure() {
        let mut session = SpeechSession::new(MockEngine::default().failing_on("x"));
        assert!(matches!(session.handle_line("x"), Outcome::Failed(_)));
        assert_eq!(session.state(), SessionState::Prompting);
    }

    #[test]
    fn invalid_utf8_input_is_an_io_error() {
        let mut session = SpeechSession::new(MockEngine::default());
        let input: &[u8] = &[0xff, 0xfe, b'\n'];
        let err = session.run(Cursor::new(input), Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
