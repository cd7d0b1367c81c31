//! Audio playback to speakers

use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};

use crate::{Error, Result};

/// Sample rate for playback (matches common TTS output)
const PLAYBACK_SAMPLE_RATE: u32 = 24000;

/// Test tone parameters: 440 Hz for half a second
const TONE_FREQ_HZ: f32 = 440.0;
const TONE_SECS: f32 = 0.5;

/// Plays audio clips on the default output device
///
/// Holds only the negotiated stream configuration; the device itself is
/// re-acquired per clip so playback survives the default output changing
/// between announcements. All methods block until the clip finishes and are
/// meant to run on a blocking task.
#[derive(Debug, Clone)]
pub struct Speaker {
    config: StreamConfig,
}

impl Speaker {
    /// Probe the default output device and negotiate a stream config.
    ///
    /// # Errors
    ///
    /// Returns an error when no output device is available or none of its
    /// configurations support the playback sample rate.
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        let supported = device
            .supported_output_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(PLAYBACK_SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(PLAYBACK_SAMPLE_RATE)
            })
            .or_else(|| {
                // Fallback: try stereo
                device.supported_output_configs().ok()?.find(|c| {
                    c.channels() == 2
                        && c.min_sample_rate() <= SampleRate(PLAYBACK_SAMPLE_RATE)
                        && c.max_sample_rate() >= SampleRate(PLAYBACK_SAMPLE_RATE)
                })
            })
            .ok_or_else(|| Error::Audio("no suitable output config found".to_string()))?;

        let config = supported
            .with_sample_rate(SampleRate(PLAYBACK_SAMPLE_RATE))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = PLAYBACK_SAMPLE_RATE,
            channels = config.channels,
            "audio playback initialized"
        );

        Ok(Self { config })
    }

    /// Play MP3 bytes.
    ///
    /// # Errors
    ///
    /// Returns an error when decoding or playback fails.
    pub fn play_mp3(&self, mp3_data: &[u8]) -> Result<()> {
        self.play_samples(decode_mp3(mp3_data)?)
    }

    /// Play an audio clip from disk, dispatching on file extension
    /// (`.mp3` or `.wav`).
    ///
    /// # Errors
    ///
    /// Returns an error when the file is missing, the extension is
    /// unsupported, or decoding/playback fails.
    pub fn play_file(&self, path: &Path) -> Result<()> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("mp3") => self.play_mp3(&std::fs::read(path)?),
            Some("wav") => self.play_samples(decode_wav(path)?),
            _ => Err(Error::Audio(format!(
                "unsupported audio clip: {}",
                path.display()
            ))),
        }
    }

    /// Play a short test tone (speaker smoke test).
    ///
    /// # Errors
    ///
    /// Returns an error when playback fails.
    pub fn play_test_tone(&self) -> Result<()> {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let samples: Vec<f32> = (0..(PLAYBACK_SAMPLE_RATE as f32 * TONE_SECS) as usize)
            .map(|i| {
                let t = i as f32 / PLAYBACK_SAMPLE_RATE as f32;
                (t * TONE_FREQ_HZ * 2.0 * std::f32::consts::PI).sin() * 0.3
            })
            .collect();
        self.play_samples(samples)
    }

    /// Play f32 samples, blocking until the clip finishes.
    fn play_samples(&self, samples: Vec<f32>) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device".to_string()))?;

        let config = self.config.clone();
        let channels = config.channels as usize;

        let sample_count = samples.len();
        let samples = Arc::new(samples);
        let position = Arc::new(Mutex::new(0usize));
        let finished = Arc::new(Mutex::new(false));

        let cb_samples = Arc::clone(&samples);
        let cb_position = Arc::clone(&position);
        let cb_finished = Arc::clone(&finished);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut pos = cb_position.lock().unwrap();

                    for frame in data.chunks_mut(channels) {
                        let sample = if *pos < cb_samples.len() {
                            cb_samples[*pos]
                        } else {
                            *cb_finished.lock().unwrap() = true;
                            0.0
                        };

                        for out in frame.iter_mut() {
                            *out = sample;
                        }

                        if *pos < cb_samples.len() {
                            *pos += 1;
                        }
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio playback error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        // Poll for completion, bounded by the clip duration plus slack.
        let duration_ms = (sample_count as u64 * 1000) / u64::from(PLAYBACK_SAMPLE_RATE);
        let timeout = std::time::Duration::from_millis(duration_ms + 500);
        let start = std::time::Instant::now();

        while !*finished.lock().unwrap() {
            if start.elapsed() > timeout {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(50));
        }

        // Let the device drain before tearing the stream down.
        std::thread::sleep(std::time::Duration::from_millis(100));

        drop(stream);
        tracing::debug!(samples = sample_count, "playback complete");

        Ok(())
    }
}

/// Decode MP3 bytes to mono f32 samples
fn decode_mp3(mp3_data: &[u8]) -> Result<Vec<f32>> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
    let mut samples = Vec::new();

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                let frame_samples: Vec<f32> = if frame.channels == 2 {
                    // Stereo: average channels
                    frame
                        .data
                        .chunks(2)
                        .map(|chunk| {
                            let left = f32::from(chunk[0]) / 32768.0;
                            let right =
                                f32::from(chunk.get(1).copied().unwrap_or(chunk[0])) / 32768.0;
                            f32::midpoint(left, right)
                        })
                        .collect()
                } else {
                    frame.data.iter().map(|&s| f32::from(s) / 32768.0).collect()
                };

                samples.extend(frame_samples);
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        }
    }

    Ok(samples)
}

/// Decode a WAV file to mono f32 samples
fn decode_wav(path: &Path) -> Result<Vec<f32>> {
    let mut reader =
        hound::WavReader::open(path).map_err(|e| Error::Audio(format!("WAV open error: {e}")))?;
    let spec = reader.spec();

    let raw: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::Audio(format!("WAV decode error: {e}")))?,
        hound::SampleFormat::Int => reader
            .samples::<i16>()
            .map(|s| s.map(|v| f32::from(v) / 32768.0))
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::Audio(format!("WAV decode error: {e}")))?,
    };

    if spec.channels == 2 {
        Ok(raw
            .chunks(2)
            .map(|chunk| f32::midpoint(chunk[0], chunk.get(1).copied().unwrap_or(chunk[0])))
            .collect())
    } else {
        Ok(raw)
    }
}
