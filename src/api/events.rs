//! Press ingestion and dashboard polling endpoints
//!
//! The routes and payload shapes are the device firmware's and dashboard's
//! fixed wire contract: `POST /emergency` with `{"type": ..., "location": ...}`
//! replies `{"status": "received"}`; `GET /latest` returns
//! `{"latest": ..., "counts": ..., "history": ...}` with a `"-"` placeholder
//! latest entry while the journal is empty.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::announce::Announcement;
use crate::config::ButtonSpec;
use crate::journal::PressEvent;

/// Ingestion request body as sent by the device
#[derive(Debug, Deserialize)]
pub struct PressRequest {
    /// Button category (e.g. `"MEDICINE"`)
    #[serde(rename = "type")]
    pub button: String,
    /// Device-reported location
    #[serde(default)]
    pub location: Option<String>,
}

/// Ingestion acknowledgement
#[derive(Debug, Serialize)]
pub struct PressResponse {
    pub status: &'static str,
}

/// The latest entry of the polling payload
///
/// Carries the resolved speech text and audio URL so the dashboard stays
/// dumb; both are absent on the empty-journal placeholder.
#[derive(Debug, Serialize)]
pub struct LatestEntry {
    #[serde(rename = "type")]
    pub button: String,
    pub message: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

impl LatestEntry {
    /// Placeholder the dashboard renders before the first press
    fn placeholder() -> Self {
        Self {
            button: "-".to_string(),
            message: "-".to_string(),
            timestamp: "-".to_string(),
            location: None,
            speech: None,
            audio: None,
        }
    }

    fn from_event(event: &PressEvent, buttons: &BTreeMap<String, ButtonSpec>) -> Self {
        let spec = buttons.get(&event.button);
        Self {
            button: event.button.clone(),
            message: event.message.clone(),
            timestamp: event.timestamp.clone(),
            location: Some(event.location.clone()),
            speech: spec.map(|s| s.speech.clone()),
            audio: spec.and_then(|s| s.audio_file.as_ref()).and_then(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| format!("/static/{name}"))
            }),
        }
    }
}

/// Polling payload
#[derive(Debug, Serialize)]
pub struct LatestResponse {
    pub latest: LatestEntry,
    pub counts: BTreeMap<String, u64>,
    pub history: Vec<PressEvent>,
}

/// Record a press and enqueue its announcement
async fn ingest(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<PressRequest>,
) -> Json<PressResponse> {
    let event = PressEvent::new(&request.button, request.location.as_deref());

    let counted = state
        .journal
        .write()
        .expect("journal lock poisoned")
        .record(event.clone());

    match state.buttons.get(&request.button) {
        Some(spec) => {
            state
                .announcer
                .enqueue(Announcement::for_button(spec, &state.quotes));
        }
        None => {
            tracing::warn!(button = %request.button, "press for unregistered button");
        }
    }

    tracing::info!(
        button = %event.button,
        location = %event.location,
        counted,
        "press recorded"
    );

    Json(PressResponse { status: "received" })
}

/// Snapshot the journal for the dashboard
async fn latest(State(state): State<Arc<ApiState>>) -> Json<LatestResponse> {
    let snapshot = state
        .journal
        .read()
        .expect("journal lock poisoned")
        .snapshot();

    let latest = snapshot
        .latest
        .as_ref()
        .map_or_else(LatestEntry::placeholder, |event| {
            LatestEntry::from_event(event, &state.buttons)
        });

    Json(LatestResponse {
        latest,
        counts: snapshot.counts,
        history: snapshot.history,
    })
}

/// Build the event router (device write path + dashboard read path)
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/emergency", post(ingest))
        .route("/latest", get(latest))
        .with_state(state)
}
