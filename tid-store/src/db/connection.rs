use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::time::Duration;

use tid_types::WeekDay;

use super::repositories::LookupRepository;
use super::schema::{schema_sql, time_slots, TIME_SLOT_STEP_MINUTES};
use crate::config::{DatabaseSettings, TableNames};
use crate::error::{StoreError, StoreResult};

/// SQLite in-memory database identifier
pub const MEMORY_DB_PATH: &str = ":memory:";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
    pub tables: TableNames,
}

impl Database {
    /// Create a new database connection pool
    pub fn new(settings: &DatabaseSettings, tables: TableNames) -> StoreResult<Self> {
        tables.validate()?;
        let in_memory = Self::is_memory_path(&settings.path);
        let manager = Self::create_connection_manager(&settings.path, in_memory);

        // Every connection to ":memory:" opens a fresh database, so an
        // in-memory pool must hold exactly one connection.
        let max_size = if in_memory { 1 } else { settings.pool_size.max(1) };
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .map_err(|e| StoreError::Connection(format!("failed to open {}: {}", settings.path, e)))?;

        tracing::debug!(path = %settings.path, max_size, "database pool created");
        Ok(Self { pool, tables })
    }

    fn is_memory_path(path: &str) -> bool {
        path.trim().eq_ignore_ascii_case(MEMORY_DB_PATH)
    }

    /// Create appropriate connection manager based on path
    ///
    /// Foreign keys are off by default in SQLite; every pooled connection
    /// turns them on so the schema's cascades apply.
    fn create_connection_manager(path: &str, in_memory: bool) -> SqliteConnectionManager {
        let manager = if in_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path.trim())
        };
        manager.with_init(|conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")
        })
    }

    /// Create an in-memory database pool (useful for testing)
    pub fn in_memory(tables: TableNames) -> StoreResult<Self> {
        let settings = DatabaseSettings {
            path: MEMORY_DB_PATH.to_string(),
            pool_size: 1,
        };
        Self::new(&settings, tables)
    }

    /// Create the tables if missing and seed the week day and time lookups.
    /// Safe to run on every startup.
    pub fn initialize(&self) -> StoreResult<()> {
        let mut conn = self.connection()?;
        conn.execute_batch(&schema_sql(&self.tables))?;

        let tx = conn.transaction()?;
        let lookups = LookupRepository::new(&tx, &self.tables);
        let days = lookups.seed_week_days(&WeekDay::ALL)?;
        let slots = lookups.seed_time_slots(&time_slots(TIME_SLOT_STEP_MINUTES))?;
        tx.commit()?;

        if days > 0 || slots > 0 {
            tracing::info!(week_days = days, time_slots = slots, "seeded lookup tables");
        }
        Ok(())
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> StoreResult<DbConnection> {
        self.pool.get().map_err(|e| {
            tracing::error!("failed to get database connection from pool: {}", e);
            StoreError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_list(db: &Database) -> Vec<String> {
        let conn = db.connection().expect("Failed to get connection");
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .expect("Failed to prepare statement");
        stmt.query_map([], |row| row.get(0))
            .expect("Failed to query tables")
            .collect::<Result<Vec<_>, _>>()
            .expect("Failed to collect tables")
    }

    #[test]
    fn test_database_creation() {
        let db = Database::in_memory(TableNames::default()).expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        let tables = table_list(&db);
        for name in TableNames::default().all() {
            assert!(tables.contains(&name.to_string()), "missing table {}", name);
        }
    }

    #[test]
    fn test_custom_table_names() {
        let names = TableNames {
            posts: "tweet_post_data".to_string(),
            post_weekdays: "tpd_wd".to_string(),
            post_times: "tpd_tt".to_string(),
            ..TableNames::default()
        };
        let db = Database::in_memory(names).expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        let tables = table_list(&db);
        assert!(tables.contains(&"tweet_post_data".to_string()));
        assert!(tables.contains(&"tpd_wd".to_string()));
        assert!(!tables.contains(&"posts".to_string()));
    }

    #[test]
    fn test_lookups_are_seeded_once() {
        let db = Database::in_memory(TableNames::default()).expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");
        db.initialize().expect("Second initialize should be a no-op");

        let conn = db.connection().expect("Failed to get connection");
        let days: i64 = conn
            .query_row("SELECT COUNT(*) FROM week_days", [], |row| row.get(0))
            .expect("Failed to count week days");
        let slots: i64 = conn
            .query_row("SELECT COUNT(*) FROM tweet_times", [], |row| row.get(0))
            .expect("Failed to count time slots");
        assert_eq!(days, 7);
        assert_eq!(slots, 288);

        let monday: String = conn
            .query_row("SELECT day_name FROM week_days WHERE id = 1", [], |row| row.get(0))
            .expect("Failed to read Monday");
        assert_eq!(monday, "Monday");
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let db = Database::in_memory(TableNames::default()).expect("Failed to create database");
        let conn = db.connection().expect("Failed to get connection");
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .expect("Failed to read pragma");
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_memory_database_detection() {
        for path in [":memory:", " :memory: ", ":MEMORY:", " :Memory: "] {
            assert!(Database::is_memory_path(path), "{} should be in-memory", path);
        }
        assert!(!Database::is_memory_path("tid.db"));

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("tid_test.db");
        let settings = DatabaseSettings {
            path: path.to_string_lossy().into_owned(),
            pool_size: 2,
        };
        let db = Database::new(&settings, TableNames::default()).expect("Failed to create file database");
        db.initialize().expect("Failed to initialize file schema");
        assert!(path.exists());
    }

    #[test]
    fn test_invalid_table_names_fail_before_connecting() {
        let names = TableNames {
            stats: "bad name".to_string(),
            ..TableNames::default()
        };
        assert!(matches!(
            Database::in_memory(names),
            Err(StoreError::Config(_))
        ));
    }
}
