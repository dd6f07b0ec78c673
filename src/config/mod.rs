//! Configuration module.
//!
//! Provides [`Settings`] (the resolved rate/volume/voice record),
//! [`ConfigPaths`] for locating `tts_config.ini`, and layered resolution via
//! [`Settings::load`] / [`Settings::resolve`].

pub mod paths;
pub mod settings;

pub use paths::{ConfigPaths, CONFIG_FILE_NAME};
pub use settings::{ConfigError, Origin, Settings, VoiceGender};
