//! Audio output: speaker playback and speech synthesis
//!
//! These are the I/O leaves behind the announcement queue. Both degrade
//! gracefully: the announcer runs log-only when no output device or TTS
//! backend is available.

pub mod playback;
pub mod tts;

pub use playback::Speaker;
pub use tts::SpeechSynth;
