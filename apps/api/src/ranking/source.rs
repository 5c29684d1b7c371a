//! Record source — the storage seam the ranking query reads from.
//!
//! `AppState` holds an `Arc<dyn ProjectSource>`; every request fetches its own
//! snapshot once and ranks it without holding any lock.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

use crate::models::project::ProjectRecord;
use crate::ranking::RankingError;

#[async_trait]
pub trait ProjectSource: Send + Sync {
    /// Returns every project, or only those whose `status` matches exactly.
    async fn fetch_projects(&self, status: Option<i32>)
        -> Result<Vec<ProjectRecord>, RankingError>;
}

const SELECT_ALL_PROJECTS: &str = r#"
    SELECT id, dapp, time, share_num, "like", launched_like, comment,
           status, created_at, updated_at
    FROM project
"#;

const SELECT_PROJECTS_BY_STATUS: &str = r#"
    SELECT id, dapp, time, share_num, "like", launched_like, comment,
           status, created_at, updated_at
    FROM project
    WHERE status = $1
"#;

/// Postgres-backed source over the `project` table.
#[derive(Clone)]
pub struct PgProjectSource {
    pool: PgPool,
}

impl PgProjectSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectSource for PgProjectSource {
    async fn fetch_projects(
        &self,
        status: Option<i32>,
    ) -> Result<Vec<ProjectRecord>, RankingError> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, ProjectRecord>(SELECT_PROJECTS_BY_STATUS)
                    .bind(status)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query_as::<_, ProjectRecord>(SELECT_ALL_PROJECTS)
                    .fetch_all(&self.pool)
                    .await
            }
        };

        rows.map_err(|e| {
            error!("Failed to load projects (status filter {status:?}): {e}");
            RankingError::SourceUnavailable(e)
        })
    }
}
