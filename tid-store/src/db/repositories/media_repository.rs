use rusqlite::{params, Connection};
use std::path::Path;

use crate::config::TableNames;

/// A media file as stored: name without extension, extension with its dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

impl MediaFile {
    /// Read `path` from disk, splitting its file name into stem and extension.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        Ok(Self {
            name,
            media_type,
            data,
        })
    }
}

pub struct MediaRepository<'a> {
    conn: &'a Connection,
    tables: &'a TableNames,
}

impl<'a> MediaRepository<'a> {
    pub fn new(conn: &'a Connection, tables: &'a TableNames) -> Self {
        Self { conn, tables }
    }

    pub fn insert(&self, post_id: i64, media: &MediaFile) -> rusqlite::Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO \"{}\" (tpd_id, media_name, media_type, media_data) VALUES (?1, ?2, ?3, ?4)",
                self.tables.media
            ),
            params![post_id, media.name, media.media_type, media.data],
        )?;
        Ok(())
    }

    /// Distinct media names of a post, sorted
    pub fn names_for_post(&self, post_id: i64) -> rusqlite::Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT media_name FROM \"{}\" WHERE tpd_id = ?1 ORDER BY media_name",
            self.tables.media
        ))?;
        let names = stmt
            .query_map([post_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    pub fn delete_for_post(&self, post_id: i64) -> rusqlite::Result<usize> {
        self.conn.execute(
            &format!("DELETE FROM \"{}\" WHERE tpd_id = ?1", self.tables.media),
            [post_id],
        )
    }

    pub fn count_for_post(&self, post_id: i64) -> rusqlite::Result<i64> {
        self.conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{}\" WHERE tpd_id = ?1", self.tables.media),
            [post_id],
            |row| row.get(0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::PostRepository;
    use crate::db::Database;
    use std::io::Write;

    #[test]
    fn test_media_file_read_splits_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sunrise.png");
        std::fs::File::create(&path).unwrap().write_all(b"\x89PNG").unwrap();

        let media = MediaFile::read(&path).unwrap();
        assert_eq!(media.name, "sunrise");
        assert_eq!(media.media_type, ".png");
        assert_eq!(media.data, b"\x89PNG".to_vec());

        let bare = dir.path().join("README");
        std::fs::write(&bare, b"text").unwrap();
        assert_eq!(MediaFile::read(&bare).unwrap().media_type, "");

        assert!(MediaFile::read(&dir.path().join("missing.jpg")).is_err());
    }

    #[test]
    fn test_insert_and_list_names() {
        let db = Database::in_memory(TableNames::default()).unwrap();
        db.initialize().unwrap();
        let conn = db.connection().unwrap();
        let post_id = PostRepository::new(&conn, &db.tables)
            .insert("p", "t", false)
            .unwrap();
        let repo = MediaRepository::new(&conn, &db.tables);

        for name in ["b", "a", "a"] {
            repo.insert(
                post_id,
                &MediaFile {
                    name: name.to_string(),
                    media_type: ".jpg".to_string(),
                    data: vec![1, 2, 3],
                },
            )
            .unwrap();
        }

        assert_eq!(repo.names_for_post(post_id).unwrap(), vec!["a", "b"]);
        assert_eq!(repo.count_for_post(post_id).unwrap(), 3);
        assert_eq!(repo.delete_for_post(post_id).unwrap(), 3);
        assert!(repo.names_for_post(post_id).unwrap().is_empty());
    }

    #[test]
    fn test_insert_for_unknown_post_violates_foreign_key() {
        let db = Database::in_memory(TableNames::default()).unwrap();
        db.initialize().unwrap();
        let conn = db.connection().unwrap();
        let repo = MediaRepository::new(&conn, &db.tables);
        let media = MediaFile {
            name: "x".to_string(),
            media_type: ".gif".to_string(),
            data: vec![],
        };
        assert!(repo.insert(999, &media).is_err());
    }
}
