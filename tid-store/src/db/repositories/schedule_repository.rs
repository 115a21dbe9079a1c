use rusqlite::{params, Connection};

use crate::config::TableNames;

/// The two junction tables tying a post to its week days and times.
pub struct ScheduleRepository<'a> {
    conn: &'a Connection,
    tables: &'a TableNames,
}

impl<'a> ScheduleRepository<'a> {
    pub fn new(conn: &'a Connection, tables: &'a TableNames) -> Self {
        Self { conn, tables }
    }

    pub fn add_week_day(&self, post_id: i64, week_day_id: i64) -> rusqlite::Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO \"{}\" (tpd_id, wd_id) VALUES (?1, ?2)",
                self.tables.post_weekdays
            ),
            params![post_id, week_day_id],
        )?;
        Ok(())
    }

    pub fn add_time(&self, post_id: i64, time_id: i64) -> rusqlite::Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO \"{}\" (tpd_id, tt_id) VALUES (?1, ?2)",
                self.tables.post_times
            ),
            params![post_id, time_id],
        )?;
        Ok(())
    }

    /// Week day names in lookup order (Monday first)
    pub fn week_day_names(&self, post_id: i64) -> rusqlite::Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT wd.day_name, wd.id
             FROM \"{junction}\" j
             JOIN \"{week_days}\" wd ON j.wd_id = wd.id
             WHERE j.tpd_id = ?1
             ORDER BY wd.id",
            junction = self.tables.post_weekdays,
            week_days = self.tables.week_days,
        ))?;
        let names = stmt
            .query_map([post_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Stored UTC times, sorted
    pub fn utc_times(&self, post_id: i64) -> rusqlite::Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT tt.time
             FROM \"{junction}\" j
             JOIN \"{tweet_times}\" tt ON j.tt_id = tt.id
             WHERE j.tpd_id = ?1
             ORDER BY tt.time",
            junction = self.tables.post_times,
            tweet_times = self.tables.tweet_times,
        ))?;
        let times = stmt
            .query_map([post_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(times)
    }

    /// Remove both kinds of junction rows for a post, times first.
    /// Returns `(times_removed, week_days_removed)`.
    pub fn delete_for_post(&self, post_id: i64) -> rusqlite::Result<(usize, usize)> {
        let times = self.conn.execute(
            &format!("DELETE FROM \"{}\" WHERE tpd_id = ?1", self.tables.post_times),
            [post_id],
        )?;
        let days = self.conn.execute(
            &format!("DELETE FROM \"{}\" WHERE tpd_id = ?1", self.tables.post_weekdays),
            [post_id],
        )?;
        Ok((times, days))
    }
}
