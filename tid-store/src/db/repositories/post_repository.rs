use rusqlite::{params, Connection, OptionalExtension};

use crate::config::TableNames;

/// A row of the posts table, before aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRow {
    pub id: i64,
    pub name: String,
    pub text: String,
    pub is_random: bool,
}

pub struct PostRepository<'a> {
    conn: &'a Connection,
    tables: &'a TableNames,
}

impl<'a> PostRepository<'a> {
    pub fn new(conn: &'a Connection, tables: &'a TableNames) -> Self {
        Self { conn, tables }
    }

    /// Insert a post and return its generated id
    pub fn insert(&self, name: &str, text: &str, is_random: bool) -> rusqlite::Result<i64> {
        self.conn.execute(
            &format!(
                "INSERT INTO \"{}\" (name, text, is_random) VALUES (?1, ?2, ?3)",
                self.tables.posts
            ),
            params![name, text, is_random],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All posts, oldest first
    pub fn list(&self) -> rusqlite::Result<Vec<PostRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name, text, is_random FROM \"{}\" ORDER BY id",
            self.tables.posts
        ))?;

        let posts = stmt
            .query_map([], |row| {
                Ok(PostRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    text: row.get(2)?,
                    is_random: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    pub fn get_by_id(&self, id: i64) -> rusqlite::Result<Option<PostRow>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT id, name, text, is_random FROM \"{}\" WHERE id = ?1",
                    self.tables.posts
                ),
                [id],
                |row| {
                    Ok(PostRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        text: row.get(2)?,
                        is_random: row.get(3)?,
                    })
                },
            )
            .optional()
    }

    /// Delete the post row only; returns the number of rows removed
    pub fn delete(&self, id: i64) -> rusqlite::Result<usize> {
        self.conn.execute(
            &format!("DELETE FROM \"{}\" WHERE id = ?1", self.tables.posts),
            [id],
        )
    }

    pub fn count(&self) -> rusqlite::Result<i64> {
        self.conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{}\"", self.tables.posts),
            [],
            |row| row.get(0),
        )
    }
}
