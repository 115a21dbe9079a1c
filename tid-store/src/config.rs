use config::{Config, File};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tid_types::CreatePolicy;

use crate::error::{StoreError, StoreResult};

/// Default settings file, looked up in the working directory
pub const CONFIG_FILE: &str = "tid.toml";

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Environment variables that override a settings key
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("DATABASE_PATH", "database.path"),
    ("DATABASE_POOL_SIZE", "database.pool_size"),
    ("TABLE_NAME_TPD", "tables.posts"),
    ("TABLE_NAME_MEDIA", "tables.media"),
    ("TABLE_NAME_TPD_WD", "tables.post_weekdays"),
    ("TABLE_NAME_TPD_TT", "tables.post_times"),
    ("TABLE_NAME_WD", "tables.week_days"),
    ("TABLE_NAME_TT", "tables.tweet_times"),
    ("TABLE_NAME_STATS", "tables.stats"),
    ("TID_REFRESH_SECS", "ui.refresh_interval_secs"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub path: String,
    pub pool_size: u32,
}

/// Physical names of the seven tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableNames {
    pub posts: String,
    pub media: String,
    pub post_weekdays: String,
    pub post_times: String,
    pub week_days: String,
    pub tweet_times: String,
    pub stats: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            posts: "posts".to_string(),
            media: "media".to_string(),
            post_weekdays: "post_weekdays".to_string(),
            post_times: "post_times".to_string(),
            week_days: "week_days".to_string(),
            tweet_times: "tweet_times".to_string(),
            stats: "stats".to_string(),
        }
    }
}

impl TableNames {
    pub fn all(&self) -> [&str; 7] {
        [
            self.posts.as_str(),
            self.media.as_str(),
            self.post_weekdays.as_str(),
            self.post_times.as_str(),
            self.week_days.as_str(),
            self.tweet_times.as_str(),
            self.stats.as_str(),
        ]
    }

    /// Names end up spliced into SQL, so each must be a plain identifier and
    /// no two may collide.
    pub fn validate(&self) -> StoreResult<()> {
        let mut seen = HashSet::new();
        for name in self.all() {
            if !IDENTIFIER.is_match(name) {
                return Err(StoreError::Config(format!(
                    "table name '{}' is not a valid SQL identifier",
                    name
                )));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(StoreError::Config(format!(
                    "table name '{}' is used for more than one table",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewaySettings {
    #[serde(default)]
    pub create_policy: CreatePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiSettings {
    pub refresh_interval_secs: u64,
    pub status_timeout_secs: u64,
}

impl UiSettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub tables: TableNames,
    pub gateway: GatewaySettings,
    pub ui: UiSettings,
}

impl Settings {
    /// Load from `tid.toml` (if present) and the process environment.
    pub fn new() -> StoreResult<Self> {
        dotenv::dotenv().ok();
        Self::load(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
    }

    /// Load from an optional settings file, then apply overrides from `env`.
    pub fn load<F>(config_file: &Path, env: F) -> StoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder();

        // 1. Optional settings file
        if config_file.exists() {
            builder = builder.add_source(File::from(PathBuf::from(config_file)).required(false));
        }

        // 2. Defaults for everything the file leaves out
        let defaults = TableNames::default();
        builder = builder
            .set_default("database.path", "tid.db")?
            .set_default("database.pool_size", 4)?
            .set_default("tables.posts", defaults.posts)?
            .set_default("tables.media", defaults.media)?
            .set_default("tables.post_weekdays", defaults.post_weekdays)?
            .set_default("tables.post_times", defaults.post_times)?
            .set_default("tables.week_days", defaults.week_days)?
            .set_default("tables.tweet_times", defaults.tweet_times)?
            .set_default("tables.stats", defaults.stats)?
            .set_default("gateway.create_policy", CreatePolicy::default().as_str())?
            .set_default("ui.refresh_interval_secs", 600)?
            .set_default("ui.status_timeout_secs", 5)?;

        // 3. Environment variables (highest priority)
        for &(var, key) in ENV_OVERRIDES {
            if let Some(value) = env(var) {
                builder = builder.set_override(key, value)?;
            }
        }
        if let Some(value) = env("TID_CREATE_POLICY") {
            let policy = CreatePolicy::parse(&value).ok_or_else(|| {
                StoreError::Config(format!("unknown create policy '{}'", value))
            })?;
            builder = builder.set_override("gateway.create_policy", policy.as_str())?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Settings for an isolated in-memory database (tests and dry runs).
    pub fn in_memory() -> Self {
        Self {
            database: DatabaseSettings {
                path: crate::db::MEMORY_DB_PATH.to_string(),
                pool_size: 1,
            },
            tables: TableNames::default(),
            gateway: GatewaySettings::default(),
            ui: UiSettings {
                refresh_interval_secs: 600,
                status_timeout_secs: 5,
            },
        }
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.database.path.trim().is_empty() {
            return Err(StoreError::Config("database.path must not be empty".to_string()));
        }
        if self.database.pool_size == 0 {
            return Err(StoreError::Config("database.pool_size must be at least 1".to_string()));
        }
        self.tables.validate()
    }
}
