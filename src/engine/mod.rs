//! Speech engine seam.
//!
//! [`SpeechEngine`] is the interface the console session drives.  Synthesis
//! itself is done by an external program; [`EspeakEngine`] is the production
//! implementation and shells out to `espeak-ng`.
//!
//! [`configure_engine`] applies resolved [`Settings`] to an engine exactly
//! once at startup.

pub mod espeak;

use std::process::ExitStatus;

use thiserror::Error;

use crate::config::{Settings, VoiceGender};

pub use espeak::EspeakEngine;

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine program could not be spawned (not installed, not on
    /// `PATH`, or not executable).
    #[error("speech engine `{program}` could not be started: {source}")]
    Unavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine program ran but reported failure.
    #[error("`{program}` exited with {status}: {stderr}")]
    Command {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// `set_voice` was given an identifier the engine does not list.
    #[error("unknown voice: {0}")]
    UnknownVoice(String),

    /// The text could not be handed to the engine.
    #[error("speech failed: {0}")]
    Speak(String),
}

// ---------------------------------------------------------------------------
// VoiceInfo
// ---------------------------------------------------------------------------

/// One entry of the engine's voice list.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceInfo {
    /// Identifier passed back to [`SpeechEngine::set_voice`].
    pub id: String,
    pub name: String,
    pub language: String,
    /// Gender as reported by the engine, when it reports one.
    pub gender: Option<VoiceGender>,
}

// ---------------------------------------------------------------------------
// SpeechEngine trait
// ---------------------------------------------------------------------------

/// A locally installed text-to-speech capability.
///
/// Object-safe so the session can hold a `Box<dyn SpeechEngine>`.
pub trait SpeechEngine {
    /// Voices in the engine's own enumeration order.
    fn voices(&self) -> Result<Vec<VoiceInfo>, EngineError>;

    /// Speaking rate in words per minute.
    fn set_rate(&mut self, wpm: u32) -> Result<(), EngineError>;

    /// Volume in 0.0 – 1.0.
    fn set_volume(&mut self, volume: f32) -> Result<(), EngineError>;

    fn set_voice(&mut self, id: &str) -> Result<(), EngineError>;

    /// Speak `text`, blocking until playback has finished.
    fn speak(&mut self, text: &str) -> Result<(), EngineError>;
}

impl<E: SpeechEngine + ?Sized> SpeechEngine for Box<E> {
    fn voices(&self) -> Result<Vec<VoiceInfo>, EngineError> {
        (**self).voices()
    }

    fn set_rate(&mut self, wpm: u32) -> Result<(), EngineError> {
        (**self).set_rate(wpm)
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), EngineError> {
        (**self).set_volume(volume)
    }

    fn set_voice(&mut self, id: &str) -> Result<(), EngineError> {
        (**self).set_voice(id)
    }

    fn speak(&mut self, text: &str) -> Result<(), EngineError> {
        (**self).speak(text)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Position in the engine's voice list used for `voice`.
///
/// This is a fixed index, not a gender lookup: `female` takes the second
/// listed voice and everything else the first, whatever those voices are.
pub fn voice_index(voice: VoiceGender) -> usize {
    match voice {
        VoiceGender::Female => 1,
        VoiceGender::Male => 0,
    }
}

/// Apply rate, volume and voice from `settings` to `engine`.
///
/// Returns the selected voice, or `None` when the engine lists too few
/// voices for the index and its own default voice stays in effect.
pub fn configure_engine<E>(
    engine: &mut E,
    settings: &Settings,
) -> Result<Option<VoiceInfo>, EngineError>
where
    E: SpeechEngine + ?Sized,
{
    engine.set_rate(settings.rate)?;
    engine.set_volume(settings.volume)?;

    let voices = engine.voices()?;
    let index = voice_index(settings.voice);
    let selected = match voices.into_iter().nth(index) {
        Some(voice) => {
            engine.set_voice(&voice.id)?;
            Some(voice)
        }
        None => {
            log::warn!(
                "Engine lists no voice at index {index} for {}; keeping its default voice",
                settings.voice
            );
            None
        }
    };

    log::info!(
        "Engine initialized with rate={}, volume={}, voice={}.",
        settings.rate,
        settings.volume,
        settings.voice
    );

    Ok(selected)
}

// ---------------------------------------------------------------------------
// MockEngine  (test-only)
// ---------------------------------------------------------------------------

/// Records every call and speaks nothing.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockEngine {
    pub voices: Vec<VoiceInfo>,
    pub rate: Option<u32>,
    pub volume: Option<f32>,
    pub voice: Option<String>,
    pub spoken: Vec<String>,
    /// Texts for which `speak` returns an error.
    pub fail_on: Vec<String>,
}

#[cfg(test)]
impl MockEngine {
    /// A mock listing `count` voices with ids `voice-0`, `voice-1`, ...
    pub fn with_voices(count: usize) -> Self {
        let voices = (0..count)
            .map(|i| VoiceInfo {
                id: format!("voice-{i}"),
                name: format!("Voice {i}"),
                language: "en".into(),
                gender: None,
            })
            .collect();
        Self {
            voices,
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, text: impl Into<String>) -> Self {
        self.fail_on.push(text.into());
        self
    }
}

#[cfg(test)]
impl SpeechEngine for MockEngine {
    fn voices(&self) -> Result<Vec<VoiceInfo>, EngineError> {
        Ok(self.voices.clone())
    }

    fn set_rate(&mut self, wpm: u32) -> Result<(), EngineError> {
        self.rate = Some(wpm);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), EngineError> {
        self.volume = Some(volume);
        Ok(())
    }

    fn set_voice(&mut self, id: &str) -> Result<(), EngineError> {
        if !self.voices.iter().any(|v| v.id == id) {
            return Err(EngineError::UnknownVoice(id.into()));
        }
        self.voice = Some(id.into());
        Ok(())
    }

    fn speak(&mut self, text: &str) -> Result<(), EngineError> {
        if self.fail_on.iter().any(|t| t == text) {
            return Err(EngineError::Speak(format!("mock failure for {text:?}")));
        }
        self.spoken.push(text.into());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
