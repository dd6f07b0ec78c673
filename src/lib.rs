//! Console text-to-speech.
//!
//! Reads lines from a console session and speaks them through a locally
//! installed speech engine.  Rate, volume and voice come from an INI file,
//! environment variables or built-in defaults.

pub mod config;
pub mod engine;
pub mod session;
