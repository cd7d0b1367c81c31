//! Shared test utilities

use std::sync::{Arc, RwLock};

use axum::Router;
use callbell::announce::{Announcement, Announcer};
use callbell::api::{dashboard, events, health, ApiState};
use callbell::{Config, EventJournal};
use tokio::sync::mpsc::UnboundedReceiver;

/// A test router plus the receiving end of its announcement queue
pub struct TestRelay {
    pub router: Router,
    pub announcements: UnboundedReceiver<Announcement>,
}

/// Build a relay router from the default configuration
#[must_use]
pub fn setup_relay() -> TestRelay {
    setup_relay_with(&Config::default())
}

/// Build a relay router from the given configuration, with an observable
/// announcement queue instead of a playback worker
#[must_use]
pub fn setup_relay_with(config: &Config) -> TestRelay {
    let journal = Arc::new(RwLock::new(EventJournal::new(
        config.journal.history_size,
        config.button_names(),
    )));
    let (handle, announcements) = Announcer::channel();
    let state = Arc::new(ApiState::new(config, journal, handle));

    let router = Router::new()
        .merge(dashboard::router())
        .merge(events::router(state.clone()))
        .merge(health::router())
        .merge(health::ready_router(state));

    TestRelay {
        router,
        announcements,
    }
}
