// Library exports for tid-store
// The TUI and the admin CLI both go through `Gateway`

pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod time;

pub use config::Settings;
pub use db::Database;
pub use error::{StoreError, StoreResult};
pub use gateway::Gateway;
pub use time::{Anchor, TimeConverter, TimeError};
