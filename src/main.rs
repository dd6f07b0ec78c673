//! Application entry point: console text-to-speech.
//!
//! # Startup sequence
//!
//! 1. Parse command-line flags.
//! 2. Initialise logging.
//! 3. Start the speech engine (`--list-voices` stops here).
//! 4. Resolve [`Settings`] from the config file, environment and defaults
//!    and apply them to the engine once.
//! 5. Run the prompt loop until `exit` or end of input.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tts_console::{
    config::{ConfigPaths, Settings},
    engine::{configure_engine, espeak::DEFAULT_PROGRAM, EspeakEngine, SpeechEngine},
    session::SpeechSession,
};

/// Speak lines typed at the console.
#[derive(Parser, Debug)]
#[command(name = "tts-console", version, about)]
struct Cli {
    /// Config file to read instead of searching for `tts_config.ini`.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Speech engine program.
    #[arg(long, value_name = "PROGRAM", default_value = DEFAULT_PROGRAM)]
    engine: String,

    /// Print the engine's voices with their index and exit.
    #[arg(long)]
    list_voices: bool,

    /// Print the resolved settings as TOML and exit.
    #[arg(long)]
    print_settings: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if cli.print_settings {
        let settings = resolve_settings(&cli)?;
        print!("{}", toml::to_string(&settings)?);
        return Ok(());
    }

    let mut engine = EspeakEngine::new(cli.engine.as_str())
        .with_context(|| format!("failed to start speech engine `{}`", cli.engine))?;

    if cli.list_voices {
        return list_voices(&engine, io::stdout().lock());
    }

    let settings = resolve_settings(&cli)?;
    configure_engine(&mut engine, &settings).context("failed to configure speech engine")?;

    let mut session = SpeechSession::new(engine);
    let stdin = io::stdin();
    session
        .run(stdin.lock(), io::stdout())
        .context("console I/O failed")?;

    Ok(())
}

fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let paths = match &cli.config {
        Some(path) => ConfigPaths::explicit(path),
        None => ConfigPaths::new(),
    };
    Settings::load(paths.resolve()).context("invalid configuration")
}

/// Print the engine's voices with the index `voice` maps onto.  Needs no
/// settings, so a broken config never gets in the way.
fn list_voices<E: SpeechEngine, W: Write>(engine: &E, mut out: W) -> Result<()> {
    for (i, voice) in engine.voices()?.iter().enumerate() {
        let gender = voice.gender.map_or("-", |g| g.as_str());
        writeln!(
            out,
            "{i:>3}  {:<16} {:<7} {:<12} {}",
            voice.id, gender, voice.language, voice.name
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tts_console::config::VoiceGender;
    use tts_console::engine::{EngineError, VoiceInfo};

    struct ListingOnly(Vec<VoiceInfo>);

    impl SpeechEngine for ListingOnly {
        fn voices(&self) -> Result<Vec<VoiceInfo>, EngineError> {
            Ok(self.0.clone())
        }
        fn set_rate(&mut self, _: u32) -> Result<(), EngineError> {
            Ok(())
        }
        fn set_volume(&mut self, _: f32) -> Result<(), EngineError> {
            Ok(())
        }
        fn set_voice(&mut self, _: &str) -> Result<(), EngineError> {
            Ok(())
        }
        fn speak(&mut self, _: &str) -> Result<(), EngineError> {
            Ok(())
        }
    }

    #[test]
    fn list_voices_prints_index_and_id() {
        let engine = ListingOnly(vec![
            VoiceInfo {
                id: "gmw/af".into(),
                name: "Afrikaans".into(),
                language: "af".into(),
                gender: Some(VoiceGender::Male),
            },
            VoiceInfo {
                id: "gmw/en-US".into(),
                name: "English_(America)".into(),
                language: "en-us".into(),
                gender: None,
            },
        ]);
        let mut out = Vec::new();
        list_voices(&engine, &mut out).expect("list");

        let text = String::from_utf8(out).expect("utf-8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  0  gmw/af"));
        assert!(lines[0].contains("male"));
        assert!(lines[1].starts_with("  1  gmw/en-US"));
    }

    #[test]
    fn list_voices_ignores_broken_config() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("tts_config.ini");
        std::fs::write(&path, "[Settings]\nrate = fast\n").expect("write");

        let cli = Cli::try_parse_from([
            "tts-console",
            "--list-voices",
            "--config",
            path.to_str().expect("utf-8 path"),
        ])
        .expect("parse");
        assert!(cli.list_voices);
        assert!(resolve_settings(&cli).is_err());

        let engine = ListingOnly(Vec::new());
        assert!(list_voices(&engine, Vec::new()).is_ok());
    }
}
