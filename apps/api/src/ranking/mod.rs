// Weighted project ranking: score model, jitter, pagination and the record
// source seam. Handlers are the only part that touches HTTP types.

pub mod handlers;
pub mod jitter;
pub mod query;
pub mod scoring;
pub mod source;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Invalid ranking request: {0}")]
    InvalidRequest(String),

    #[error("Project source unavailable: {0}")]
    SourceUnavailable(#[from] sqlx::Error),
}
