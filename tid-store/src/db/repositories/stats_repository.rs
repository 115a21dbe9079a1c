use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection};

use super::{parse_date_column, parse_time_column};
use crate::config::TableNames;
use crate::time::format_time_of_day;

/// A stats row joined with its post and week day names; date and time in UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub id: i64,
    pub post_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub day_name: String,
    pub status: String,
}

pub struct StatsRepository<'a> {
    conn: &'a Connection,
    tables: &'a TableNames,
}

impl<'a> StatsRepository<'a> {
    pub fn new(conn: &'a Connection, tables: &'a TableNames) -> Self {
        Self { conn, tables }
    }

    pub fn insert(
        &self,
        post_id: i64,
        date: NaiveDate,
        time: NaiveTime,
        week_day_id: i64,
        status: &str,
    ) -> rusqlite::Result<i64> {
        self.conn.execute(
            &format!(
                "INSERT INTO \"{}\" (tpd_id, date, time, wd_id, status) VALUES (?1, ?2, ?3, ?4, ?5)",
                self.tables.stats
            ),
            params![
                post_id,
                date.format("%Y-%m-%d").to_string(),
                format_time_of_day(time),
                week_day_id,
                status
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Every stats row joined with post and week day names, oldest run first
    pub fn list(&self) -> rusqlite::Result<Vec<StatRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT s.id, p.name, s.date, s.time, wd.day_name, s.status
             FROM \"{stats}\" s
             JOIN \"{posts}\" p ON s.tpd_id = p.id
             JOIN \"{week_days}\" wd ON s.wd_id = wd.id
             ORDER BY s.date, s.time, s.id",
            stats = self.tables.stats,
            posts = self.tables.posts,
            week_days = self.tables.week_days,
        ))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(StatRow {
                    id: row.get(0)?,
                    post_name: row.get(1)?,
                    date: parse_date_column(2, row.get(2)?)?,
                    time: parse_time_column(3, row.get(3)?)?,
                    day_name: row.get(4)?,
                    status: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn count_for_post(&self, post_id: i64) -> rusqlite::Result<i64> {
        self.conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{}\" WHERE tpd_id = ?1", self.tables.stats),
            [post_id],
            |row| row.get(0),
        )
    }
}
