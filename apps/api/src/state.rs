use std::sync::Arc;

use crate::ranking::jitter::JitterMode;
use crate::ranking::scoring::ScoreModel;
use crate::ranking::source::ProjectSource;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Record source. Postgres in production, swapped for an in-memory set in tests.
    pub source: Arc<dyn ProjectSource>,
    pub score_model: Arc<ScoreModel>,
    pub jitter: JitterMode,
}
