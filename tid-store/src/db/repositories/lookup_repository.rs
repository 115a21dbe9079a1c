use rusqlite::{params, Connection, OptionalExtension};

use tid_types::WeekDay;

use crate::config::TableNames;

/// Read and seed access to the week day and time of day lookup tables.
pub struct LookupRepository<'a> {
    conn: &'a Connection,
    tables: &'a TableNames,
}

impl<'a> LookupRepository<'a> {
    pub fn new(conn: &'a Connection, tables: &'a TableNames) -> Self {
        Self { conn, tables }
    }

    /// Returns the number of rows actually inserted
    pub fn seed_week_days(&self, days: &[WeekDay]) -> rusqlite::Result<usize> {
        let mut stmt = self.conn.prepare(&format!(
            "INSERT OR IGNORE INTO \"{}\" (id, day_name) VALUES (?1, ?2)",
            self.tables.week_days
        ))?;
        let mut inserted = 0;
        for day in days {
            inserted += stmt.execute(params![day.lookup_id(), day.as_str()])?;
        }
        Ok(inserted)
    }

    /// `slots` are UTC `HH:MM:SS` strings
    pub fn seed_time_slots(&self, slots: &[String]) -> rusqlite::Result<usize> {
        let mut stmt = self.conn.prepare(&format!(
            "INSERT OR IGNORE INTO \"{}\" (time) VALUES (?1)",
            self.tables.tweet_times
        ))?;
        let mut inserted = 0;
        for slot in slots {
            inserted += stmt.execute([slot])?;
        }
        Ok(inserted)
    }

    pub fn week_day_id(&self, day_name: &str) -> rusqlite::Result<Option<i64>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT id FROM \"{}\" WHERE day_name = ?1 COLLATE NOCASE",
                    self.tables.week_days
                ),
                [day_name.trim()],
                |row| row.get(0),
            )
            .optional()
    }

    /// `utc_time` must already be normalized to `HH:MM:SS`
    pub fn time_id(&self, utc_time: &str) -> rusqlite::Result<Option<i64>> {
        self.conn
            .query_row(
                &format!("SELECT id FROM \"{}\" WHERE time = ?1", self.tables.tweet_times),
                [utc_time],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn week_days(&self) -> rusqlite::Result<Vec<(i64, String)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, day_name FROM \"{}\" ORDER BY id",
            self.tables.week_days
        ))?;
        let days = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(days)
    }

    pub fn time_slots(&self) -> rusqlite::Result<Vec<(i64, String)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, time FROM \"{}\" ORDER BY time",
            self.tables.tweet_times
        ))?;
        let slots = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn seeded() -> Database {
        let db = Database::in_memory(TableNames::default()).unwrap();
        db.initialize().unwrap();
        db
    }

    #[test]
    fn test_week_day_resolution() {
        let db = seeded();
        let conn = db.connection().unwrap();
        let repo = LookupRepository::new(&conn, &db.tables);

        assert_eq!(repo.week_day_id("Monday").unwrap(), Some(1));
        assert_eq!(repo.week_day_id("friday").unwrap(), Some(5));
        assert_eq!(repo.week_day_id("Funday").unwrap(), None);
    }

    #[test]
    fn test_time_resolution() {
        let db = seeded();
        let conn = db.connection().unwrap();
        let repo = LookupRepository::new(&conn, &db.tables);

        assert!(repo.time_id("09:00:00").unwrap().is_some());
        assert!(repo.time_id("09:03:00").unwrap().is_none());
        assert!(repo.time_id("09:00").unwrap().is_none());
    }

    #[test]
    fn test_seeding_is_idempotent() {
        let db = seeded();
        let conn = db.connection().unwrap();
        let repo = LookupRepository::new(&conn, &db.tables);

        assert_eq!(repo.seed_week_days(&WeekDay::ALL).unwrap(), 0);
        assert_eq!(repo.seed_time_slots(&["09:00:00".to_string()]).unwrap(), 0);
        assert_eq!(repo.seed_time_slots(&["09:03:00".to_string()]).unwrap(), 1);

        let days = repo.week_days().unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(days[6], (7, "Sunday".to_string()));
        assert_eq!(repo.time_slots().unwrap().len(), 289);
    }
}
