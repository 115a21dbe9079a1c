use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input for creating a scheduled post.
///
/// Week day names and times are kept as the caller supplied them; the
/// gateway resolves them against the lookup tables and reports the ones it
/// could not resolve in [`CreatedPost::skipped`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPost {
    pub name: String,
    pub text: String,
    pub is_random: bool,
    #[serde(default)]
    pub media_paths: Vec<PathBuf>,
    #[serde(default)]
    pub week_days: Vec<String>,
    /// Local wall-clock times, `HH:MM` or `HH:MM:SS`.
    #[serde(default)]
    pub times: Vec<String>,
}

/// A stored post aggregated across its media, week days and times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    pub id: i64,
    pub name: String,
    pub text: String,
    pub media_files: Vec<String>,
    pub is_random: bool,
    pub week_days: Vec<String>,
    /// Local `HH:MM:SS` values, sorted.
    pub tweet_times: Vec<String>,
}

/// One execution record joined with its post and week day names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatView {
    pub id: i64,
    pub post_name: String,
    /// Local date of the run.
    pub date: NaiveDate,
    /// Local `HH:MM:SS` of the run.
    pub time: String,
    pub day_name: String,
    pub status: String,
}

/// Something `create_post` left out under the best-effort policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkippedItem {
    Media { path: PathBuf, reason: String },
    WeekDay { name: String, reason: String },
    Time { time: String, reason: String },
}

impl std::fmt::Display for SkippedItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkippedItem::Media { path, reason } => {
                write!(f, "media '{}': {}", path.display(), reason)
            }
            SkippedItem::WeekDay { name, reason } => write!(f, "week day '{}': {}", name, reason),
            SkippedItem::Time { time, reason } => write!(f, "time '{}': {}", time, reason),
        }
    }
}

/// Result of a successful `create_post`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedPost {
    pub id: i64,
    #[serde(default)]
    pub skipped: Vec<SkippedItem>,
}

impl CreatedPost {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}
