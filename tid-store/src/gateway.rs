use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use rusqlite::Connection;
use std::collections::HashSet;

use tid_types::{CreatePolicy, CreatedPost, NewPost, PostView, SkippedItem, StatView, WeekDay};

use crate::config::Settings;
use crate::db::repositories::{
    LookupRepository, MediaFile, MediaRepository, PostRepository, ScheduleRepository,
    StatsRepository,
};
use crate::db::Database;
use crate::error::{StoreError, StoreResult};
use crate::time::{format_time_of_day, TimeConverter};

/// Composite operations over the scheduling tables.
///
/// Every call checks one connection out of the pool and returns it on drop.
/// No call holds two connections at once, so a single-connection pool (the
/// in-memory case) never blocks.
#[derive(Clone)]
pub struct Gateway<Tz: TimeZone = Local> {
    db: Database,
    policy: CreatePolicy,
    clock: TimeConverter<Tz>,
}

impl Gateway<Local> {
    /// Open the configured database, create missing tables and seed lookups.
    pub fn connect(settings: &Settings) -> StoreResult<Self> {
        let db = Database::new(&settings.database, settings.tables.clone())?;
        db.initialize()?;
        tracing::info!(
            path = %settings.database.path,
            policy = settings.gateway.create_policy.as_str(),
            "gateway ready"
        );
        Ok(Self::new(db, settings.gateway.create_policy))
    }

    pub fn new(db: Database, policy: CreatePolicy) -> Self {
        Self {
            db,
            policy,
            clock: TimeConverter::local(),
        }
    }
}

impl<Tz: TimeZone> Gateway<Tz> {
    /// Swap the zone used at the presentation boundary.
    pub fn with_converter<Z: TimeZone>(self, clock: TimeConverter<Z>) -> Gateway<Z> {
        Gateway {
            db: self.db,
            policy: self.policy,
            clock,
        }
    }

    pub fn with_policy(mut self, policy: CreatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> CreatePolicy {
        self.policy
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn converter(&self) -> &TimeConverter<Tz> {
        &self.clock
    }

    /// Insert a post and its media, week days and times.
    ///
    /// Under [`CreatePolicy::BestEffort`] the post row commits on its own and
    /// every dependent that fails is reported in [`CreatedPost::skipped`].
    /// Under [`CreatePolicy::AllOrNothing`] the first failure rolls back the
    /// post and is returned.
    pub fn create_post(&self, post: &NewPost) -> StoreResult<CreatedPost> {
        let result = match self.policy {
            CreatePolicy::BestEffort => self.create_best_effort(post),
            CreatePolicy::AllOrNothing => self.create_atomic(post),
        };
        logged("create_post", result)
    }

    fn create_best_effort(&self, post: &NewPost) -> StoreResult<CreatedPost> {
        let conn = self.db.connection()?;
        let id = PostRepository::new(&conn, &self.db.tables).insert(
            &post.name,
            &post.text,
            post.is_random,
        )?;

        let mut attach = Attachments::lenient(id);
        self.attach_all(&conn, post, &mut attach)?;

        tracing::info!(post_id = id, skipped = attach.skipped.len(), "post created");
        Ok(CreatedPost {
            id,
            skipped: attach.skipped,
        })
    }

    fn create_atomic(&self, post: &NewPost) -> StoreResult<CreatedPost> {
        let mut conn = self.db.connection()?;
        let tx = conn.transaction()?;
        let id = PostRepository::new(&tx, &self.db.tables).insert(
            &post.name,
            &post.text,
            post.is_random,
        )?;

        let mut attach = Attachments::strict(id);
        self.attach_all(&tx, post, &mut attach)?;
        tx.commit()?;

        tracing::info!(post_id = id, "post created");
        Ok(CreatedPost {
            id,
            skipped: Vec::new(),
        })
    }

    fn attach_all(
        &self,
        conn: &Connection,
        post: &NewPost,
        attach: &mut Attachments,
    ) -> StoreResult<()> {
        let tables = &self.db.tables;
        let media = MediaRepository::new(conn, tables);
        let lookups = LookupRepository::new(conn, tables);
        let schedule = ScheduleRepository::new(conn, tables);
        let post_id = attach.post_id;

        for path in &post.media_paths {
            let outcome = MediaFile::read(path)
                .map_err(|source| StoreError::Media {
                    path: path.clone(),
                    source,
                })
                .and_then(|file| Ok(media.insert(post_id, &file)?));
            attach.settle(outcome, |reason| SkippedItem::Media {
                path: path.clone(),
                reason,
            })?;
        }

        // Duplicates are collapsed on the resolved id so "monday" and "Monday"
        // produce one junction row.
        let mut days = HashSet::new();
        for name in &post.week_days {
            let outcome = lookups
                .week_day_id(name)
                .map_err(StoreError::from)
                .and_then(|id| {
                    id.ok_or_else(|| {
                        StoreError::Constraint(format!("week day '{}' is not in the lookup table", name.trim()))
                    })
                })
                .and_then(|id| {
                    if days.insert(id) {
                        schedule.add_week_day(post_id, id)?;
                    }
                    Ok(())
                });
            attach.settle(outcome, |reason| SkippedItem::WeekDay {
                name: name.clone(),
                reason,
            })?;
        }

        let mut times = HashSet::new();
        for time in &post.times {
            let outcome = self
                .clock
                .to_utc(time)
                .map_err(StoreError::from)
                .and_then(|utc| {
                    lookups.time_id(&utc)?.ok_or_else(|| {
                        StoreError::Constraint(format!("no time slot matches {} UTC", utc))
                    })
                })
                .and_then(|id| {
                    if times.insert(id) {
                        schedule.add_time(post_id, id)?;
                    }
                    Ok(())
                });
            attach.settle(outcome, |reason| SkippedItem::Time {
                time: time.clone(),
                reason,
            })?;
        }

        Ok(())
    }

    /// Every post with its media names, week days and local times.
    pub fn list_posts(&self) -> StoreResult<Vec<PostView>> {
        logged("list_posts", self.read_posts())
    }

    fn read_posts(&self) -> StoreResult<Vec<PostView>> {
        let conn = self.db.connection()?;
        let tables = &self.db.tables;
        let media = MediaRepository::new(&conn, tables);
        let schedule = ScheduleRepository::new(&conn, tables);

        let mut views = Vec::new();
        for row in PostRepository::new(&conn, tables).list()? {
            let mut tweet_times = self.clock.times_utc_to_local(&schedule.utc_times(row.id)?)?;
            tweet_times.sort();
            views.push(PostView {
                id: row.id,
                media_files: media.names_for_post(row.id)?,
                week_days: schedule.week_day_names(row.id)?,
                tweet_times,
                name: row.name,
                text: row.text,
                is_random: row.is_random,
            });
        }
        Ok(views)
    }

    /// Remove a post with its time links, week day links and media, in that
    /// order, as one transaction.
    pub fn delete_post(&self, id: i64) -> StoreResult<()> {
        logged("delete_post", self.delete_in_transaction(id))
    }

    fn delete_in_transaction(&self, id: i64) -> StoreResult<()> {
        let mut conn = self.db.connection()?;
        let tx = conn.transaction()?;
        let tables = &self.db.tables;

        let (times, days) = ScheduleRepository::new(&tx, tables).delete_for_post(id)?;
        let media = MediaRepository::new(&tx, tables).delete_for_post(id)?;
        if PostRepository::new(&tx, tables).delete(id)? == 0 {
            // Dropping the transaction rolls it back
            return Err(StoreError::NotFound(id));
        }
        tx.commit()?;

        tracing::info!(post_id = id, times, days, media, "post deleted");
        Ok(())
    }

    /// Execution records with their date and time moved to the local zone.
    pub fn list_stats(&self) -> StoreResult<Vec<StatView>> {
        logged("list_stats", self.read_stats())
    }

    fn read_stats(&self) -> StoreResult<Vec<StatView>> {
        let conn = self.db.connection()?;
        let rows = StatsRepository::new(&conn, &self.db.tables).list()?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let local = self.clock.utc_datetime_to_local(row.date.and_time(row.time));
                StatView {
                    id: row.id,
                    post_name: row.post_name,
                    date: local.date(),
                    time: format_time_of_day(local.time()),
                    // Weekday of the local date, not the stored UTC one
                    day_name: WeekDay::from_chrono(local.date().weekday()).to_string(),
                    status: row.status,
                }
            })
            .collect())
    }

    /// Store one execution record for `post_id`.
    pub fn record_stat(
        &self,
        post_id: i64,
        run_at: DateTime<Utc>,
        day: WeekDay,
        status: &str,
    ) -> StoreResult<i64> {
        logged("record_stat", self.insert_stat(post_id, run_at, day, status))
    }

    fn insert_stat(
        &self,
        post_id: i64,
        run_at: DateTime<Utc>,
        day: WeekDay,
        status: &str,
    ) -> StoreResult<i64> {
        let conn = self.db.connection()?;
        let tables = &self.db.tables;

        if PostRepository::new(&conn, tables).get_by_id(post_id)?.is_none() {
            return Err(StoreError::NotFound(post_id));
        }
        let day_id = LookupRepository::new(&conn, tables)
            .week_day_id(day.as_str())?
            .ok_or_else(|| StoreError::Constraint(format!("week day '{}' is not in the lookup table", day)))?;

        let naive = run_at.naive_utc();
        let id = StatsRepository::new(&conn, tables).insert(
            post_id,
            naive.date(),
            naive.time(),
            day_id,
            status,
        )?;
        tracing::debug!(post_id, stat_id = id, status, "stat recorded");
        Ok(id)
    }

    pub fn week_days(&self) -> StoreResult<Vec<(i64, String)>> {
        logged("week_days", self.read_lookup(|lookups| lookups.week_days()))
    }

    /// Time slots as stored (UTC).
    pub fn time_slots(&self) -> StoreResult<Vec<(i64, String)>> {
        logged("time_slots", self.read_lookup(|lookups| lookups.time_slots()))
    }

    fn read_lookup<F>(&self, read: F) -> StoreResult<Vec<(i64, String)>>
    where
        F: FnOnce(&LookupRepository<'_>) -> rusqlite::Result<Vec<(i64, String)>>,
    {
        let conn = self.db.connection()?;
        Ok(read(&LookupRepository::new(&conn, &self.db.tables))?)
    }

    /// Row count of every table, keyed by its configured name.
    pub fn table_counts(&self) -> StoreResult<Vec<(String, i64)>> {
        logged("table_counts", self.count_rows())
    }

    fn count_rows(&self) -> StoreResult<Vec<(String, i64)>> {
        let conn = self.db.connection()?;
        self.db
            .tables
            .all()
            .into_iter()
            .map(|table| -> StoreResult<(String, i64)> {
                let count: i64 =
                    conn.query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table), [], |row| row.get(0))?;
                Ok((table.to_string(), count))
            })
            .collect()
    }
}

/// Collects dependents that could not be stored for one post.
struct Attachments {
    post_id: i64,
    strict: bool,
    skipped: Vec<SkippedItem>,
}

impl Attachments {
    fn lenient(post_id: i64) -> Self {
        Self {
            post_id,
            strict: false,
            skipped: Vec::new(),
        }
    }

    fn strict(post_id: i64) -> Self {
        Self {
            post_id,
            strict: true,
            skipped: Vec::new(),
        }
    }

    fn settle<F>(&mut self, outcome: StoreResult<()>, skip: F) -> StoreResult<()>
    where
        F: FnOnce(String) -> SkippedItem,
    {
        match outcome {
            Ok(()) => Ok(()),
            Err(err) if self.strict => Err(err),
            Err(err) => {
                let item = skip(skip_reason(&err));
                tracing::warn!(post_id = self.post_id, "skipping {}", item);
                self.skipped.push(item);
                Ok(())
            }
        }
    }
}

fn skip_reason(err: &StoreError) -> String {
    match err {
        StoreError::Media { source, .. } => source.to_string(),
        StoreError::Constraint(msg) => msg.clone(),
        other => other.to_string(),
    }
}

fn logged<T>(operation: &str, result: StoreResult<T>) -> StoreResult<T> {
    if let Err(err) = &result {
        match err {
            StoreError::NotFound(_) => tracing::warn!(operation, "{}", err),
            _ => tracing::error!(operation, "{}", err),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableNames;
    use chrono::FixedOffset;

    fn gateway(policy: CreatePolicy) -> Gateway<FixedOffset> {
        let db = Database::in_memory(TableNames::default()).unwrap();
        db.initialize().unwrap();
        Gateway::new(db, policy).with_converter(TimeConverter::new(FixedOffset::east_opt(0).unwrap()))
    }

    #[test]
    fn test_duplicate_days_and_times_collapse() {
        let gw = gateway(CreatePolicy::BestEffort);
        let created = gw
            .create_post(&NewPost {
                name: "dup".to_string(),
                text: "t".to_string(),
                week_days: vec!["monday".to_string(), "Monday".to_string(), "Mon".to_string()],
                times: vec!["09:00".to_string(), "09:00:00".to_string()],
                ..NewPost::default()
            })
            .unwrap();

        // "Mon" is not a lookup name
        assert_eq!(created.skipped.len(), 1);
        let posts = gw.list_posts().unwrap();
        assert_eq!(posts[0].week_days, vec!["Monday"]);
        assert_eq!(posts[0].tweet_times, vec!["09:00:00"]);
    }

    #[test]
    fn test_off_grid_time_is_skipped_with_reason() {
        let gw = gateway(CreatePolicy::BestEffort);
        let created = gw
            .create_post(&NewPost {
                name: "odd".to_string(),
                times: vec!["09:03".to_string(), "not a time".to_string()],
                ..NewPost::default()
            })
            .unwrap();

        assert_eq!(created.skipped.len(), 2);
        match &created.skipped[0] {
            SkippedItem::Time { time, reason } => {
                assert_eq!(time, "09:03");
                assert!(reason.contains("09:03:00"));
            }
            other => panic!("unexpected skip {:?}", other),
        }
    }

    #[test]
    fn test_record_stat_for_unknown_post() {
        let gw = gateway(CreatePolicy::BestEffort);
        let err = gw
            .record_stat(99, Utc::now(), WeekDay::Monday, "posted")
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(99)));
    }

    #[test]
    fn test_table_counts_use_configured_names() {
        let gw = gateway(CreatePolicy::BestEffort);
        let counts = gw.table_counts().unwrap();
        assert_eq!(counts.len(), 7);
        assert!(counts.contains(&("week_days".to_string(), 7)));
        assert!(counts.contains(&("tweet_times".to_string(), 288)));
        assert!(counts.contains(&("posts".to_string(), 0)));
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_lookup_checkout_failure_is_logged_per_operation() {
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .connection_timeout(std::time::Duration::from_millis(50))
            .build(r2d2_sqlite::SqliteConnectionManager::memory())
            .unwrap();
        let db = Database {
            pool,
            tables: TableNames::default(),
        };
        let gw = Gateway::new(db, CreatePolicy::BestEffort);
        let _held = gw.database().connection().unwrap();

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            assert!(matches!(gw.week_days(), Err(StoreError::Connection(_))));
            assert!(matches!(gw.time_slots(), Err(StoreError::Connection(_))));
            assert!(matches!(gw.table_counts(), Err(StoreError::Connection(_))));
        });

        let logs = captured.text();
        assert!(logs.contains("week_days"), "{}", logs);
        assert!(logs.contains("time_slots"), "{}", logs);
        assert!(logs.contains("table_counts"), "{}", logs);
    }
}
