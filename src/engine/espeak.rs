//! `espeak-ng` speech engine.
//!
//! Each call to [`SpeechEngine::speak`] runs the program once and waits for
//! it to exit, which is when playback has finished:
//!
//! ```text
//! espeak-ng -s <wpm> -a <amplitude> [-v <voice>] -- <text>
//! ```
//!
//! espeak's amplitude runs 0 – 200 with 100 as its normal loudness, so a
//! volume of 1.0 maps to 100.

use std::ffi::OsStr;
use std::process::{Command, Output, Stdio};

use crate::config::VoiceGender;
use crate::engine::{EngineError, SpeechEngine, VoiceInfo};

pub const DEFAULT_PROGRAM: &str = "espeak-ng";

/// Production engine backed by the `espeak-ng` command-line program.
#[derive(Debug, Clone)]
pub struct EspeakEngine {
    program: String,
    voices: Vec<VoiceInfo>,
    rate: u32,
    amplitude: u32,
    voice: Option<String>,
}

impl EspeakEngine {
    /// Probe `program` and read its voice list.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Unavailable`]: the program cannot be spawned.
    /// - [`EngineError::Command`]: `--version` or `--voices` exited unsuccessfully.
    pub fn new(program: impl Into<String>) -> Result<Self, EngineError> {
        let program = program.into();

        let version = run(&program, ["--version"])?;
        log::debug!(
            "{program}: {}",
            String::from_utf8_lossy(&version.stdout).trim()
        );

        let listing = run(&program, ["--voices"])?;
        let voices = parse_voices(&String::from_utf8_lossy(&listing.stdout));
        log::debug!("{program} lists {} voices", voices.len());

        Ok(Self {
            program,
            voices,
            rate: 175,
            amplitude: 100,
            voice: None,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments for one `speak` invocation.  `--` keeps text that starts
    /// with a dash from being read as an option.
    fn speak_args(&self, text: &str) -> Vec<String> {
        let mut args = vec![
            "-s".to_string(),
            self.rate.to_string(),
            "-a".to_string(),
            self.amplitude.to_string(),
        ];
        if let Some(voice) = &self.voice {
            args.push("-v".into());
            args.push(voice.clone());
        }
        args.push("--".into());
        args.push(text.to_string());
        args
    }
}

impl SpeechEngine for EspeakEngine {
    fn voices(&self) -> Result<Vec<VoiceInfo>, EngineError> {
        Ok(self.voices.clone())
    }

    fn set_rate(&mut self, wpm: u32) -> Result<(), EngineError> {
        self.rate = wpm;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), EngineError> {
        self.amplitude = volume_to_amplitude(volume);
        Ok(())
    }

    fn set_voice(&mut self, id: &str) -> Result<(), EngineError> {
        if !self.voices.iter().any(|v| v.id == id) {
            return Err(EngineError::UnknownVoice(id.to_string()));
        }
        self.voice = Some(id.to_string());
        Ok(())
    }

    fn speak(&mut self, text: &str) -> Result<(), EngineError> {
        if text.contains('\0') {
            return Err(EngineError::Speak("text contains a NUL byte".into()));
        }
        let args = self.speak_args(text);
        run(&self.program, args)?;
        Ok(())
    }
}

/// Run `program` to completion.  Stdout is captured for the probe calls,
/// stderr is kept for error reporting.
fn run<I, S>(program: &str, args: I) -> Result<Output, EngineError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| EngineError::Unavailable {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(EngineError::Command {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

fn volume_to_amplitude(volume: f32) -> u32 {
    (volume.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Parse the table printed by `espeak-ng --voices`:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  af              --/M      Afrikaans          gmw/af
///  5  en-gb           --/M      English_(Great_Britain) gmw/en          (en 2)
/// ```
///
/// The file column is the identifier accepted by `-v`.
pub fn parse_voices(listing: &str) -> Vec<VoiceInfo> {
    listing
        .lines()
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 5 || cols[0].parse::<u32>().is_err() {
                return None;
            }
            let gender = match cols[2].rsplit('/').next() {
                Some("F") => Some(VoiceGender::Female),
                Some("M") => Some(VoiceGender::Male),
                _ => None,
            };
            Some(VoiceInfo {
                id: cols[4].to_string(),
                name: cols[3].to_string(),
                language: cols[1].to_string(),
                gender,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 5  en-gb           --/M      English_(Great_Britain) gmw/en          (en 2)
 2  en-us           --/F      English_(America)  gmw/en-US            (en 3)
 5  yue             --/-      Chinese_(Cantonese) sit/yue             (zh-yue 5)
";

    fn engine() -> EspeakEngine {
        EspeakEngine {
            program: DEFAULT_PROGRAM.into(),
            voices: parse_voices(LISTING),
            rate: 175,
            amplitude: 100,
            voice: None,
        }
    }

    #[test]
    fn parses_voice_table_in_order() {
        let voices = parse_voices(LISTING);
        let ids: Vec<&str> = voices.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["gmw/af", "gmw/en", "gmw/en-US", "sit/yue"]);
        assert_eq!(voices[1].name, "English_(Great_Britain)");
        assert_eq!(voices[1].language, "en-gb");
    }

    #[test]
    fn parses_reported_gender() {
        let voices = parse_voices(LISTING);
        assert_eq!(voices[0].gender, Some(VoiceGender::Male));
        assert_eq!(voices[2].gender, Some(VoiceGender::Female));
        assert_eq!(voices[3].gender, None);
    }

    #[test]
    fn header_and_blank_lines_are_skipped() {
        assert!(parse_voices("Pty Language Age/Gender VoiceName File\n\n").is_empty());
    }

    #[test]
    fn volume_maps_to_amplitude() {
        assert_eq!(volume_to_amplitude(1.0), 100);
        assert_eq!(volume_to_amplitude(0.5), 50);
        assert_eq!(volume_to_amplitude(0.0), 0);
        assert_eq!(volume_to_amplitude(0.333), 33);
    }

    #[test]
    fn speak_args_without_voice() {
        let e = engine();
        assert_eq!(e.speak_args("hello"), ["-s", "175", "-a", "100", "--", "hello"]);
    }

    #[test]
    fn speak_args_reflect_settings() {
        let mut e = engine();
        e.set_rate(150).unwrap();
        e.set_volume(0.5).unwrap();
        e.set_voice("gmw/en-US").unwrap();
        assert_eq!(
            e.speak_args("-dash first"),
            ["-s", "150", "-a", "50", "-v", "gmw/en-US", "--", "-dash first"]
        );
    }

    #[test]
    fn unknown_voice_is_rejected() {
        let mut e = engine();
        assert!(matches!(
            e.set_voice("nope"),
            Err(EngineError::UnknownVoice(id)) if id == "nope"
        ));
        assert!(e.voice.is_none());
    }

    #[test]
    fn nul_byte_text_is_rejected_before_spawn() {
        let mut e = engine();
        assert!(matches!(e.speak("a\0b"), Err(EngineError::Speak(_))));
    }

    #[test]
    fn missing_program_is_unavailable() {
        let result = EspeakEngine::new("definitely-not-a-speech-engine-binary");
        assert!(
            matches!(result, Err(EngineError::Unavailable { .. })),
            "expected Unavailable, got: {result:?}"
        );
    }
}
