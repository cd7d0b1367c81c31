use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, RwLock};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use callbell::audio::{Speaker, SpeechSynth};
use callbell::{Announcer, ApiServer, Config, EventJournal};

/// Callbell - call-button notification relay with spoken alerts
#[derive(Parser)]
#[command(name = "callbell", version, about)]
struct Cli {
    /// Path to the config file (defaults to the platform config dir)
    #[arg(short, long, env = "CALLBELL_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured port
    #[arg(long, env = "CALLBELL_PORT")]
    port: Option<u16>,

    /// Override the configured bind address
    #[arg(long, env = "CALLBELL_BIND")]
    bind: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable audio output (for headless servers without audio hardware)
    #[arg(long, env = "CALLBELL_DISABLE_AUDIO")]
    disable_audio: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,callbell=info",
        1 => "info,callbell=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if cli.disable_audio {
        config.audio.enabled = false;
    }

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestSpeaker => test_speaker().await,
            Command::TestTts { text } => test_tts(&config, &text).await,
        };
    }

    tracing::info!(
        port = config.server.port,
        buttons = config.buttons.len(),
        audio = config.audio.enabled,
        "starting callbell relay"
    );

    let journal = Arc::new(RwLock::new(EventJournal::new(
        config.journal.history_size,
        config.button_names(),
    )));
    let announcer = Announcer::spawn(&config.audio);

    ApiServer::new(&config, journal, announcer).run().await?;
    Ok(())
}

/// Play a short tone through the default output device
async fn test_speaker() -> anyhow::Result<()> {
    tracing::info!("playing test tone");
    let speaker = Speaker::new()?;
    tokio::task::spawn_blocking(move || speaker.play_test_tone()).await??;
    tracing::info!("test tone done");
    Ok(())
}

/// Synthesize the given text and play it
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    let synth = SpeechSynth::from_config(&config.audio)?
        .ok_or_else(|| anyhow::anyhow!("TTS provider is off in configuration"))?;

    tracing::info!(%text, "synthesizing");
    let mp3 = synth.synthesize(text).await?;

    let speaker = Speaker::new()?;
    tokio::task::spawn_blocking(move || speaker.play_mp3(&mp3)).await??;
    tracing::info!("TTS test done");
    Ok(())
}
