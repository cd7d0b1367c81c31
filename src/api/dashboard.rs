//! Embedded dashboard page
//!
//! The page is an I/O leaf: it polls `/latest` every two seconds, renders
//! whatever counters the payload carries, and speaks or plays the latest
//! entry using the `speech`/`audio` fields resolved by the server.

use axum::response::Html;
use axum::routing::get;
use axum::Router;

/// The dashboard page, compiled into the binary
const DASHBOARD_HTML: &str = include_str!("../../assets/dashboard.html");

/// Serve the dashboard
#[allow(clippy::unused_async)]
async fn page() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

/// Build the dashboard router
pub fn router() -> Router {
    Router::new().route("/", get(page))
}
