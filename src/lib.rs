//! Callbell - call-button notification relay with spoken alerts
//!
//! This library provides the core functionality for the callbell relay:
//! - In-memory press journal (bounded history, per-button counters)
//! - HTTP ingestion and dashboard polling endpoints
//! - Decoupled announcement queue (TTS and audio-clip playback)
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐  POST /emergency   ┌─────────────────────────┐
//! │ button device │───────────────────▶│         callbell        │
//! └───────────────┘                    │                         │
//!                                      │   journal ─▶ announcer  │
//! ┌───────────────┐  GET /latest       │  (history,     (TTS,    │
//! │   dashboard   │◀───────────────────│   counters)   speaker)  │
//! └───────────────┘                    └─────────────────────────┘
//! ```
//!
//! The journal is the only shared mutable state: the write path records a
//! press and returns immediately, the read path snapshots under the same
//! lock, and playback runs on its own queue so a slow speaker never stalls
//! the device.

pub mod announce;
pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod journal;

pub use announce::{Announcement, Announcer, AnnouncerHandle};
pub use api::{ApiServer, ApiState};
pub use config::{AudioConfig, ButtonSpec, Config, ServerConfig, TtsProvider};
pub use error::{Error, Result};
pub use journal::{EventJournal, JournalSnapshot, PressEvent};
