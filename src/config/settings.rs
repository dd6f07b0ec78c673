//! Settings record and layered resolution.
//!
//! Each field is taken from the first source that provides it:
//!
//! | Field    | `[Settings]` key | Environment  | Default    |
//! |----------|------------------|--------------|------------|
//! | `rate`   | `rate`           | `TTS_RATE`   | `100`      |
//! | `volume` | `volume`         | `TTS_VOLUME` | `1.0`      |
//! | `voice`  | `voice`          | `TTS_VOICE`  | `"female"` |
//!
//! Keys in `[DEFAULT]` count as file values unless `[Settings]` sets them.
//! An environment variable is consulted only when the file does not carry
//! the key.  A value that is present but malformed is an error, never a
//! silent fallback.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use ini::{Ini, ParseOption, Properties};
use serde::Serialize;
use thiserror::Error;

/// INI section holding all keys.
pub const SECTION: &str = "Settings";

/// Keys here apply to every section unless the section sets them itself.
pub const DEFAULT_SECTION: &str = "DEFAULT";

pub const DEFAULT_RATE: u32 = 100;
pub const DEFAULT_VOLUME: f32 = 1.0;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read or parsed as INI.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// A key was present but its value could not be parsed.
    #[error("invalid value {value:?} for `{key}` (from {origin}): {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        origin: Origin,
        reason: String,
    },

    /// Keys appear before the first `[section]` header.
    #[error("config file {} has keys before the first section header", path.display())]
    MissingSectionHeader { path: PathBuf },

    #[error("config file {}: section [{section}] appears more than once", path.display())]
    DuplicateSection { path: PathBuf, section: String },

    /// Key names are compared case-insensitively.
    #[error("config file {}: key `{key}` appears more than once in [{section}]", path.display())]
    DuplicateKey {
        path: PathBuf,
        section: String,
        key: String,
    },

    #[error("volume {0} is outside the range 0.0 to 1.0")]
    VolumeOutOfRange(f32),
}

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    File,
    Environment,
    Default,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::File => "config file",
            Origin::Environment => "environment",
            Origin::Default => "default",
        })
    }
}

// ---------------------------------------------------------------------------
// VoiceGender
// ---------------------------------------------------------------------------

/// Requested voice.  Maps onto an engine voice index, not onto any gender
/// metadata the engine reports (see [`crate::engine::configure_engine`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    #[default]
    Female,
    Male,
}

impl VoiceGender {
    /// Case-insensitive.  Anything other than `"female"` selects
    /// [`VoiceGender::Male`]; unrecognised strings are logged.
    pub fn parse(value: &str) -> Self {
        let lower = value.trim().to_lowercase();
        match lower.as_str() {
            "female" => VoiceGender::Female,
            "male" => VoiceGender::Male,
            _ => {
                log::warn!("Unrecognised voice {value:?}; using the male (first) voice");
                VoiceGender::Male
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceGender::Female => "female",
            VoiceGender::Male => "male",
        }
    }
}

impl fmt::Display for VoiceGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Effective speech settings.  Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Speaking rate in words per minute.
    pub rate: u32,
    /// Output volume, 0.0 – 1.0.
    pub volume: f32,
    pub voice: VoiceGender,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE,
            volume: DEFAULT_VOLUME,
            voice: VoiceGender::Female,
        }
    }
}

/// Keys of the `[Settings]` section, lower-cased.
pub type FileValues = HashMap<String, String>;

impl Settings {
    /// Resolve settings from `path` and the process environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::resolve(path, |name| std::env::var(name).ok())
    }

    /// Resolve settings from `path`, looking environment variables up
    /// through `env`.
    ///
    /// A missing file is not an error: it is logged as a warning and the
    /// environment and defaults are used instead.
    pub fn resolve<F>(path: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = if path.is_file() {
            let values = read_section(path)?;
            log::info!("Loaded configuration from {}.", path.display());
            values
        } else if path.exists() {
            log::warn!(
                "{} is not a regular file. Using environment variables or defaults.",
                path.display()
            );
            FileValues::new()
        } else {
            log::warn!(
                "{} not found. Using environment variables or defaults.",
                path.display()
            );
            FileValues::new()
        };

        Self::from_sources(&file, env)
    }

    /// Merge already-read file values with the environment and defaults.
    pub fn from_sources<F>(file: &FileValues, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rate = match lookup(file, &env, "rate", "TTS_RATE") {
            Some((raw, origin)) => {
                let rate = raw.trim().parse::<u32>().map_err(|e| ConfigError::InvalidValue {
                    key: "rate",
                    value: raw.clone(),
                    origin,
                    reason: e.to_string(),
                })?;
                log::debug!("rate = {rate} ({origin})");
                rate
            }
            None => {
                log::debug!("rate = {DEFAULT_RATE} ({})", Origin::Default);
                DEFAULT_RATE
            }
        };

        let volume = match lookup(file, &env, "volume", "TTS_VOLUME") {
            Some((raw, origin)) => {
                let volume = raw.trim().parse::<f32>().map_err(|e| ConfigError::InvalidValue {
                    key: "volume",
                    value: raw.clone(),
                    origin,
                    reason: e.to_string(),
                })?;
                log::debug!("volume = {volume} ({origin})");
                volume
            }
            None => {
                log::debug!("volume = {DEFAULT_VOLUME} ({})", Origin::Default);
                DEFAULT_VOLUME
            }
        };
        if !(0.0..=1.0).contains(&volume) {
            return Err(ConfigError::VolumeOutOfRange(volume));
        }

        let voice = match lookup(file, &env, "voice", "TTS_VOICE") {
            Some((raw, origin)) => {
                let voice = VoiceGender::parse(&raw);
                log::debug!("voice = {voice} ({origin})");
                voice
            }
            None => {
                let voice = VoiceGender::default();
                log::debug!("voice = {voice} ({})", Origin::Default);
                voice
            }
        };

        Ok(Self { rate, volume, voice })
    }
}

/// File value first, then the environment variable.  `None` means the
/// default applies.
fn lookup<F>(
    file: &FileValues,
    env: &F,
    key: &'static str,
    var: &'static str,
) -> Option<(String, Origin)>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = file.get(key) {
        return Some((value.clone(), Origin::File));
    }
    env(var).map(|value| (value, Origin::Environment))
}

/// Read the `[Settings]` section of an INI file, with `[DEFAULT]` keys
/// filling in what it does not set.  Section names are case-sensitive, key
/// names are not.
///
/// Keys outside any section, a repeated section and a repeated key are all
/// errors.  `[DEFAULT]` is ignored when there is no `[Settings]` section.
fn read_section(path: &Path) -> Result<FileValues, ConfigError> {
    let opt = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_file_opt(path, opt).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if ini.section(None::<String>).is_some_and(|general| !general.is_empty()) {
        return Err(ConfigError::MissingSectionHeader {
            path: path.to_path_buf(),
        });
    }

    for name in [DEFAULT_SECTION, SECTION] {
        if ini.section_all(Some(name)).count() > 1 {
            return Err(ConfigError::DuplicateSection {
                path: path.to_path_buf(),
                section: name.to_string(),
            });
        }
    }

    let mut values = match ini.section(Some(DEFAULT_SECTION)) {
        Some(props) => section_values(path, DEFAULT_SECTION, props)?,
        None => FileValues::new(),
    };

    let Some(section) = ini.section(Some(SECTION)) else {
        log::debug!("{} has no [{SECTION}] section", path.display());
        return Ok(FileValues::new());
    };
    values.extend(section_values(path, SECTION, section)?);

    Ok(values)
}

fn section_values(path: &Path, name: &str, props: &Properties) -> Result<FileValues, ConfigError> {
    let mut values = FileValues::new();
    for (key, value) in props.iter() {
        let key = key.trim().to_lowercase();
        if values.contains_key(&key) {
            return Err(ConfigError::DuplicateKey {
                path: path.to_path_buf(),
                section: name.to_string(),
                key,
            });
        }
        values.insert(key, value.trim().to_string());
    }
    Ok(values)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
