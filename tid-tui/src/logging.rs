use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_FILE: &str = "tid_debug.log";

/// Categories that can be switched on and off independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFeature {
    KeyEvents,
    Rendering,
    /// Calls into the persistence gateway
    GatewayCalls,
    General,
}

impl LogFeature {
    pub fn target(&self) -> &'static str {
        match self {
            LogFeature::KeyEvents => "key_events",
            LogFeature::Rendering => "rendering",
            LogFeature::GatewayCalls => "gateway_calls",
            LogFeature::General => "general",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogFeatures {
    pub key_events: bool,
    pub rendering: bool,
    pub gateway_calls: bool,
    pub general: bool,
}

impl LogFeatures {
    fn all() -> Self {
        Self {
            key_events: true,
            rendering: true,
            gateway_calls: true,
            general: true,
        }
    }
}

impl Default for LogFeatures {
    fn default() -> Self {
        Self {
            key_events: false,
            rendering: false,
            ..Self::all()
        }
    }
}

/// Where and how much the TUI logs.
///
/// The terminal belongs to the UI, so output always goes to a file.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub enabled: bool,
    pub log_file: PathBuf,
    /// Truncate the file when logging starts
    pub clear_on_startup: bool,
    pub features: LogFeatures,
    pub level: LevelFilter,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            clear_on_startup: true,
            features: LogFeatures::default(),
            level: LevelFilter::Info,
        }
    }
}

impl LogConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Every category at trace level (`--verbose`)
    pub fn verbose() -> Self {
        Self {
            level: LevelFilter::Trace,
            features: LogFeatures::all(),
            ..Default::default()
        }
    }

    pub fn allows(&self, feature: LogFeature) -> bool {
        self.enabled
            && match feature {
                LogFeature::KeyEvents => self.features.key_events,
                LogFeature::Rendering => self.features.rendering,
                LogFeature::GatewayCalls => self.features.gateway_calls,
                LogFeature::General => self.features.general,
            }
    }
}

fn open_log_file(path: &Path, truncate: bool) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true);
    if truncate {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }
    options.open(path)
}

/// Install the global file logger. Gateway events arrive here too, through
/// tracing's `log` feature.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    if !config.enabled {
        log::set_max_level(LevelFilter::Off);
        return Ok(());
    }

    let file = open_log_file(&config.log_file, config.clear_on_startup)?;
    let format = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|builder| builder)
        .build();
    WriteLogger::init(config.level, format, file)?;

    log::info!(
        "Logging to {} at {:?}",
        config.log_file.display(),
        config.level
    );
    log::debug!("Log features: {:?}", config.features);
    Ok(())
}

/// Log under `feature` when the config allows it.
#[macro_export]
macro_rules! log_feature {
    ($config:expr, $feature:expr, $level:expr, $($arg:tt)*) => {{
        let feature = $feature;
        if $config.allows(feature) {
            log::log!(target: feature.target(), $level, $($arg)*);
        }
    }};
}

#[macro_export]
macro_rules! log_key_event {
    ($config:expr, $($arg:tt)*) => {
        $crate::log_feature!($config, $crate::logging::LogFeature::KeyEvents, log::Level::Debug, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_rendering {
    ($config:expr, $($arg:tt)*) => {
        $crate::log_feature!($config, $crate::logging::LogFeature::Rendering, log::Level::Trace, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_gateway_call {
    ($config:expr, $($arg:tt)*) => {
        $crate::log_feature!($config, $crate::logging::LogFeature::GatewayCalls, log::Level::Debug, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($config:expr, $($arg:tt)*) => {
        $crate::log_feature!($config, $crate::logging::LogFeature::General, log::Level::Debug, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn test_verbose_enables_every_feature() {
        let config = LogConfig::verbose();
        assert_eq!(config.level, LevelFilter::Trace);
        assert!(config.allows(LogFeature::KeyEvents));
        assert!(config.allows(LogFeature::Rendering));
        assert!(config.allows(LogFeature::GatewayCalls));
    }

    #[test]
    fn test_default_skips_noisy_features() {
        let config = LogConfig::default();
        assert!(!config.allows(LogFeature::KeyEvents));
        assert!(!config.allows(LogFeature::Rendering));
        assert!(config.allows(LogFeature::General));
    }

    #[test]
    fn test_disabled_allows_nothing() {
        let config = LogConfig::disabled();
        assert!(!config.allows(LogFeature::GatewayCalls));
        assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_open_log_file_truncates_or_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tid.log");
        std::fs::write(&path, "old run\n").unwrap();

        let read = |path: &Path| {
            let mut contents = String::new();
            File::open(path).unwrap().read_to_string(&mut contents).unwrap();
            contents
        };

        open_log_file(&path, false).unwrap().write_all(b"more\n").unwrap();
        assert_eq!(read(&path), "old run\nmore\n");

        open_log_file(&path, true).unwrap().write_all(b"fresh\n").unwrap();
        assert_eq!(read(&path), "fresh\n");
    }

    #[test]
    fn test_macros_expand_with_disabled_config() {
        let config = LogConfig::disabled();
        crate::log_key_event!(config, "key {}", 1);
        crate::log_gateway_call!(config, "call {}", "list_posts");
    }
}
