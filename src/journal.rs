//! In-memory press journal
//!
//! The journal is the relay's only shared mutable state: a bounded ring of
//! the most recent presses, a per-button press counter, and the latest-press
//! pointer. The ingestion handler writes through [`EventJournal::record`],
//! the polling handler reads through [`EventJournal::snapshot`]; both hold
//! the lock only for brief in-memory operations that never span an `.await`
//! point, so the journal is shared as `Arc<std::sync::RwLock<EventJournal>>`.
//!
//! History is non-persistent and bounded; the journal is not an event store.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;
use uuid::Uuid;

/// A single recorded button press
#[derive(Debug, Clone, Serialize)]
pub struct PressEvent {
    /// Unique press ID
    pub id: Uuid,
    /// Button category as reported by the device (e.g. `"MEDICINE"`)
    #[serde(rename = "type")]
    pub button: String,
    /// Human-readable description shown on the dashboard
    pub message: String,
    /// Device-reported location
    pub location: String,
    /// ISO 8601 timestamp assigned at ingestion
    pub timestamp: String,
}

impl PressEvent {
    /// Create a press event stamped with the current time.
    ///
    /// `location` falls back to `"Unknown"` when the device omits it.
    #[must_use]
    pub fn new(button: &str, location: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            button: button.to_string(),
            message: format!("{button} button pressed"),
            location: location.unwrap_or("Unknown").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Owned, serializable copy of the journal handed to the read path
///
/// All three fields are taken under a single lock acquisition, so the
/// latest pointer, the counters, and the history agree with each other.
#[derive(Debug, Clone, Serialize)]
pub struct JournalSnapshot {
    /// The newest press, absent when no press has been recorded yet
    pub latest: Option<PressEvent>,
    /// Press count per registered button
    pub counts: BTreeMap<String, u64>,
    /// Recent presses, oldest first
    pub history: Vec<PressEvent>,
}

/// Bounded press history with per-button counters
#[derive(Debug)]
pub struct EventJournal {
    history: VecDeque<PressEvent>,
    capacity: usize,
    counts: BTreeMap<String, u64>,
}

impl EventJournal {
    /// Create a journal holding at most `capacity` presses.
    ///
    /// Counters are pre-registered for every name in `buttons` so the
    /// dashboard sees all configured buttons at zero from startup. Presses
    /// for unregistered buttons are kept in history but never counted.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; configuration loading rejects that
    /// value before a journal is ever constructed.
    #[must_use]
    pub fn new<I, S>(capacity: usize, buttons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        assert!(capacity > 0, "journal capacity must be nonzero");
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            counts: buttons.into_iter().map(|b| (b.into(), 0)).collect(),
        }
    }

    /// Record a press: append to history (evicting the oldest entry once at
    /// capacity) and bump the matching counter.
    ///
    /// Returns `true` when the press was counted, `false` when its button
    /// has no registered counter.
    pub fn record(&mut self, event: PressEvent) -> bool {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        let counted = match self.counts.get_mut(&event.button) {
            Some(n) => {
                *n += 1;
                true
            }
            None => false,
        };
        self.history.push_back(event);
        counted
    }

    /// The newest recorded press
    #[must_use]
    pub fn latest(&self) -> Option<&PressEvent> {
        self.history.back()
    }

    /// Number of presses currently held in history
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether no press has been recorded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Maximum number of presses held in history
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Consistent copy of latest + counts + history for the read path
    #[must_use]
    pub fn snapshot(&self) -> JournalSnapshot {
        JournalSnapshot {
            latest: self.history.back().cloned(),
            counts: self.counts.clone(),
            history: self.history.iter().cloned().collect(),
        }
    }
}
