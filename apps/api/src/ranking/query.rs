//! Ranking query — validates the page request, scores every candidate, orders
//! by rank key (highest first, then `id` ascending) and slices out one page.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::project::ProjectRecord;
use crate::ranking::jitter::{JitterMode, JitterSource};
use crate::ranking::scoring::{RankKey, ScoreModel};
use crate::ranking::source::ProjectSource;
use crate::ranking::RankingError;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;

/// A validated page request. Out-of-range values are rejected, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingRequest {
    page: u64,
    per_page: u64,
    status: Option<i32>,
}

impl Default for RankingRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            status: None,
        }
    }
}

impl RankingRequest {
    pub fn new(
        page: Option<i64>,
        per_page: Option<i64>,
        status: Option<i64>,
    ) -> Result<Self, RankingError> {
        let page = match page {
            None => DEFAULT_PAGE,
            Some(p) if p >= 1 => p as u64,
            Some(p) => {
                return Err(RankingError::InvalidRequest(format!(
                    "page must be at least 1, got {p}"
                )))
            }
        };

        let per_page = match per_page {
            None => DEFAULT_PER_PAGE,
            Some(n) if (1..=MAX_PER_PAGE as i64).contains(&n) => n as u64,
            Some(n) => {
                return Err(RankingError::InvalidRequest(format!(
                    "per_page must be between 1 and {MAX_PER_PAGE}, got {n}"
                )))
            }
        };

        let status = status
            .map(|s| {
                i32::try_from(s).map_err(|_| {
                    RankingError::InvalidRequest(format!("status {s} is out of range"))
                })
            })
            .transpose()?;

        Ok(Self {
            page,
            per_page,
            status,
        })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn status(&self) -> Option<i32> {
        self.status
    }

    pub fn offset(&self) -> usize {
        let offset = (self.page - 1).saturating_mul(self.per_page);
        usize::try_from(offset).unwrap_or(usize::MAX)
    }
}

/// Scores, orders and paginates one request-local snapshot.
///
/// Records whose key is not finite are logged and dropped; the rest of the
/// page is still served. Records not matching the status filter are ignored
/// even if the source returned them.
pub fn rank_records(
    records: Vec<ProjectRecord>,
    request: &RankingRequest,
    model: &ScoreModel,
    now: DateTime<Utc>,
    jitter: &mut JitterSource,
) -> Vec<ProjectRecord> {
    let candidates = records.len();
    let mut excluded = 0usize;

    let mut ranked: Vec<(RankKey, ProjectRecord)> = records
        .into_iter()
        .filter(|record| request.status().map_or(true, |s| record.status == s))
        .filter_map(|record| {
            let r = jitter.draw(record.id);
            match model.rank_key(&record, now, r) {
                Ok(key) => Some((key, record)),
                Err(e) => {
                    warn!("Excluding project from ranking: {e}");
                    excluded += 1;
                    None
                }
            }
        })
        .collect();

    // Highest key first; equal keys fall back to ascending id
    ranked.sort_by(|(ka, a), (kb, b)| kb.compare(ka).then_with(|| a.id.cmp(&b.id)));

    let page: Vec<ProjectRecord> = ranked
        .into_iter()
        .skip(request.offset())
        .take(request.per_page() as usize)
        .map(|(_, record)| record)
        .collect();

    debug!(
        "Ranked {candidates} candidates ({excluded} excluded), page {} returned {} projects",
        request.page(),
        page.len()
    );
    page
}

/// One ranking evaluation over an injected record source.
pub struct RankingQuery<'a> {
    source: &'a dyn ProjectSource,
    model: &'a ScoreModel,
    jitter: JitterMode,
}

impl<'a> RankingQuery<'a> {
    pub fn new(source: &'a dyn ProjectSource, model: &'a ScoreModel, jitter: JitterMode) -> Self {
        Self {
            source,
            model,
            jitter,
        }
    }

    /// Fetches the candidate set once, then ranks it synchronously.
    pub async fn execute(
        &self,
        request: &RankingRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<ProjectRecord>, RankingError> {
        let records = self.source.fetch_projects(request.status()).await?;
        let mut jitter = JitterSource::for_request(self.jitter, now);
        Ok(rank_records(records, request, self.model, now, &mut jitter))
    }
}
