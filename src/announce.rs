//! Decoupled announcement queue
//!
//! Every press enqueues at most one [`Announcement`]; a single worker task
//! drains the queue and drives the speaker. The queue is unbounded and
//! `enqueue` is synchronous, so the ingestion path never waits on playback.
//! Playback and synthesis failures are logged and never propagate.

use std::path::PathBuf;

use rand::seq::SliceRandom as _;
use tokio::sync::mpsc;

use crate::audio::{Speaker, SpeechSynth};
use crate::config::{AudioConfig, ButtonSpec};

/// One queued side effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Announcement {
    /// Synthesize and speak this text
    Speak(String),
    /// Play an audio clip from disk
    PlayFile(PathBuf),
}

impl Announcement {
    /// Resolve what a press of `button` should announce.
    ///
    /// An audio clip wins over speech; a quote button speaks a random entry
    /// from `quotes`. Quote buttons are validated against an empty pool at
    /// configuration load, so the fallback to the button's fixed speech is
    /// only a safety net.
    #[must_use]
    pub fn for_button(button: &ButtonSpec, quotes: &[String]) -> Self {
        if let Some(path) = &button.audio_file {
            return Self::PlayFile(path.clone());
        }
        if button.quote {
            if let Some(quote) = quotes.choose(&mut rand::thread_rng()) {
                return Self::Speak(quote.clone());
            }
        }
        Self::Speak(button.speech.clone())
    }
}

/// Cheap clonable sender for the announcement queue
#[derive(Debug, Clone)]
pub struct AnnouncerHandle {
    tx: mpsc::UnboundedSender<Announcement>,
}

impl AnnouncerHandle {
    /// Enqueue an announcement, best-effort.
    ///
    /// Never blocks and never fails the caller: a closed queue (worker gone)
    /// is logged at warn and the announcement is dropped.
    pub fn enqueue(&self, announcement: Announcement) {
        if self.tx.send(announcement).is_err() {
            tracing::warn!("announcement queue closed, dropping announcement");
        }
    }

    /// Whether the worker is still draining the queue (readiness probe)
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// The announcement worker
pub struct Announcer;

impl Announcer {
    /// Create a queue without spawning a worker.
    ///
    /// Used by tests to observe what the ingestion path enqueues.
    #[must_use]
    pub fn channel() -> (AnnouncerHandle, mpsc::UnboundedReceiver<Announcement>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (AnnouncerHandle { tx }, rx)
    }

    /// Spawn the worker task and return the handle the API holds.
    ///
    /// When audio is disabled, the output device is unavailable, or no TTS
    /// backend is configured, the worker degrades to logging each
    /// announcement instead of failing startup.
    #[must_use]
    pub fn spawn(audio: &AudioConfig) -> AnnouncerHandle {
        let (handle, rx) = Self::channel();

        let output = if audio.enabled {
            build_output(audio)
        } else {
            tracing::info!("audio disabled, announcements will be logged only");
            None
        };

        drop(tokio::spawn(run_worker(rx, output)));
        handle
    }
}

/// Speaker plus optional synthesis backend
struct Output {
    speaker: Speaker,
    synth: Option<SpeechSynth>,
}

fn build_output(audio: &AudioConfig) -> Option<Output> {
    let speaker = match Speaker::new() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "no audio output, announcements will be logged only");
            return None;
        }
    };

    let synth = match SpeechSynth::from_config(audio) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "TTS unavailable, speech announcements will be logged only");
            None
        }
    };

    Some(Output { speaker, synth })
}

/// Drain the queue one announcement at a time, in arrival order.
async fn run_worker(mut rx: mpsc::UnboundedReceiver<Announcement>, output: Option<Output>) {
    while let Some(announcement) = rx.recv().await {
        let Some(output) = &output else {
            tracing::info!(?announcement, "announcement");
            continue;
        };
        if let Err(e) = play(output, announcement).await {
            tracing::warn!(error = %e, "announcement playback failed");
        }
    }
    tracing::debug!("announcement queue closed, worker exiting");
}

async fn play(output: &Output, announcement: Announcement) -> crate::Result<()> {
    match announcement {
        Announcement::Speak(text) => {
            let Some(synth) = &output.synth else {
                tracing::info!(%text, "speech announcement (no TTS backend)");
                return Ok(());
            };
            tracing::debug!(%text, "speaking announcement");
            let mp3 = synth.synthesize(&text).await?;
            let speaker = output.speaker.clone();
            tokio::task::spawn_blocking(move || speaker.play_mp3(&mp3))
                .await
                .map_err(|e| crate::Error::Audio(format!("playback task failed: {e}")))??;
        }
        Announcement::PlayFile(path) => {
            tracing::debug!(path = %path.display(), "playing announcement clip");
            let speaker = output.speaker.clone();
            tokio::task::spawn_blocking(move || speaker.play_file(&path))
                .await
                .map_err(|e| crate::Error::Audio(format!("playback task failed: {e}")))??;
        }
    }
    Ok(())
}
