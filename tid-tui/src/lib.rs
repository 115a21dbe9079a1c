// Library interface for the tid terminal UI (also used by the integration tests)
pub mod app;

#[macro_use]
pub mod logging;

pub mod terminal;
pub mod ui;
