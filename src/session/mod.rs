//! Console speech session.
//!
//! ```text
//! stdin ──read_line──▶ Command::classify
//!                        ├─ Exit   → Exiting
//!                        ├─ Empty  → notice on stdout, re-prompt
//!                        └─ Speak  → SpeechEngine::speak (blocking)
//!                                      └─ error → log, re-prompt
//! ```

pub mod runner;
pub mod state;

pub use runner::{SpeechSession, EMPTY_INPUT_MESSAGE, PROMPT};
pub use state::{Command, Outcome, SessionState, SessionSummary, EXIT_COMMAND};
