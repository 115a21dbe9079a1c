mod lookup_repository;
mod media_repository;
mod post_repository;
mod schedule_repository;
mod stats_repository;

pub use lookup_repository::LookupRepository;
pub use media_repository::{MediaFile, MediaRepository};
pub use post_repository::{PostRepository, PostRow};
pub use schedule_repository::ScheduleRepository;
pub use stats_repository::{StatRow, StatsRepository};

use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::Type;

/// Date and time columns are stored as text; surface bad values as conversion errors
pub(crate) fn parse_date_column(idx: usize, value: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_time_column(idx: usize, value: String) -> rusqlite::Result<NaiveTime> {
    NaiveTime::parse_from_str(&value, crate::time::TIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
