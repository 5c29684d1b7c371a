use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the `project` table.
///
/// Serialized field names follow the public API contract (`dapp`, `share_num`,
/// `like`, ...). Scores are never stored on this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProjectRecord {
    pub id: i64,
    #[sqlx(rename = "dapp")]
    #[serde(rename = "dapp")]
    pub platform: String,
    pub time: i64,
    #[sqlx(rename = "share_num")]
    #[serde(rename = "share_num")]
    pub share_count: i64,
    #[sqlx(rename = "like")]
    #[serde(rename = "like")]
    pub like_count: i64,
    #[sqlx(rename = "launched_like")]
    #[serde(rename = "launched_like")]
    pub post_launch_like_count: i64,
    #[sqlx(rename = "comment")]
    #[serde(rename = "comment")]
    pub comment_count: i64,
    pub status: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectRecord {
    pub fn platform(&self) -> Platform {
        Platform::from_label(&self.platform)
    }
}

/// Platform category a project was launched on.
///
/// Labels outside the known set map to `Other` rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Sexy,
    Pump,
    Other,
}

impl Platform {
    /// Exact, case-sensitive match against the stored label.
    pub fn from_label(label: &str) -> Self {
        match label {
            "sexy" => Platform::Sexy,
            "pump" => Platform::Pump,
            _ => Platform::Other,
        }
    }
}
