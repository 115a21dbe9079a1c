use crate::config::TableNames;

/// Minute granularity of the seeded `tweet_times` lookup
pub const TIME_SLOT_STEP_MINUTES: u32 = 5;

/// SQL schema for the TID database, with the configured table names spliced in.
/// Names are validated identifiers (see `TableNames::validate`).
pub fn schema_sql(t: &TableNames) -> String {
    format!(
        r#"
-- Scheduled posts
CREATE TABLE IF NOT EXISTS "{posts}" (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    text TEXT NOT NULL,
    is_random INTEGER NOT NULL DEFAULT 0
);

-- Media attached to a post
CREATE TABLE IF NOT EXISTS "{media}" (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tpd_id INTEGER NOT NULL,
    media_name TEXT NOT NULL,
    media_type TEXT NOT NULL,
    media_data BLOB NOT NULL,
    FOREIGN KEY (tpd_id) REFERENCES "{posts}"(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS "idx_{media}_tpd_id" ON "{media}"(tpd_id);

-- Week day lookup (Monday = 1)
CREATE TABLE IF NOT EXISTS "{week_days}" (
    id INTEGER PRIMARY KEY,
    day_name TEXT UNIQUE NOT NULL
);

-- Time of day lookup, UTC HH:MM:SS
CREATE TABLE IF NOT EXISTS "{tweet_times}" (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    time TEXT UNIQUE NOT NULL
);

-- Post-week day junction table
CREATE TABLE IF NOT EXISTS "{post_weekdays}" (
    tpd_id INTEGER NOT NULL,
    wd_id INTEGER NOT NULL,
    PRIMARY KEY (tpd_id, wd_id),
    FOREIGN KEY (tpd_id) REFERENCES "{posts}"(id) ON DELETE CASCADE,
    FOREIGN KEY (wd_id) REFERENCES "{week_days}"(id)
);

-- Post-time junction table
CREATE TABLE IF NOT EXISTS "{post_times}" (
    tpd_id INTEGER NOT NULL,
    tt_id INTEGER NOT NULL,
    PRIMARY KEY (tpd_id, tt_id),
    FOREIGN KEY (tpd_id) REFERENCES "{posts}"(id) ON DELETE CASCADE,
    FOREIGN KEY (tt_id) REFERENCES "{tweet_times}"(id)
);

-- Execution statistics, date and time in UTC
CREATE TABLE IF NOT EXISTS "{stats}" (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tpd_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    time TEXT NOT NULL,
    wd_id INTEGER NOT NULL,
    status TEXT NOT NULL,
    FOREIGN KEY (tpd_id) REFERENCES "{posts}"(id) ON DELETE CASCADE,
    FOREIGN KEY (wd_id) REFERENCES "{week_days}"(id)
);

CREATE INDEX IF NOT EXISTS "idx_{stats}_tpd_id" ON "{stats}"(tpd_id);
"#,
        posts = t.posts,
        media = t.media,
        week_days = t.week_days,
        tweet_times = t.tweet_times,
        post_weekdays = t.post_weekdays,
        post_times = t.post_times,
        stats = t.stats,
    )
}

/// Every `HH:MM:00` slot of the day at `step` minute intervals.
pub fn time_slots(step_minutes: u32) -> Vec<String> {
    (0..24 * 60)
        .step_by(step_minutes.max(1) as usize)
        .map(|minute| format!("{:02}:{:02}:00", minute / 60, minute % 60))
        .collect()
}
