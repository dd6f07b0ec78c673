//! Config file discovery using the `dirs` crate.
//!
//! Search order when no explicit path is given:
//!
//!   1. `./tts_config.ini` (current working directory)
//!   2. User config dir:
//!        Windows: %APPDATA%\tts-console\tts_config.ini
//!        macOS:   ~/Library/Application Support/tts-console/tts_config.ini
//!        Linux:   ~/.config/tts-console/tts_config.ini

use std::path::{Path, PathBuf};

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "tts_config.ini";

/// Candidate locations for the config file, highest priority first.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    candidates: Vec<PathBuf>,
}

impl ConfigPaths {
    const APP_NAME: &'static str = "tts-console";

    /// Builds the default search list: working directory, then the per-user
    /// config directory when the platform provides one.
    pub fn new() -> Self {
        let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join(Self::APP_NAME).join(CONFIG_FILE_NAME));
        }
        Self { candidates }
    }

    /// A search list holding only `path`.  Used for `--config`.
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            candidates: vec![path.into()],
        }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Returns the first candidate that exists on disk, or the primary
    /// candidate when none do (so the "not found" warning names it).
    pub fn resolve(&self) -> &Path {
        self.candidates
            .iter()
            .find(|p| p.is_file())
            .or_else(|| self.candidates.first())
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(CONFIG_FILE_NAME))
    }
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::new()
    }
}
