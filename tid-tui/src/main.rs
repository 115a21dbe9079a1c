use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tid::app::App;
use tid::{logging, terminal, ui};
use tid_store::config::CONFIG_FILE;
use tid_store::{Gateway, Settings};

/// tid - schedule social media posts from the terminal
#[derive(Parser)]
#[command(name = "tid")]
#[command(about = "Create, review and delete scheduled posts")]
#[command(version)]
struct Cli {
    /// Settings file (optional; defaults and environment fill the rest)
    #[arg(long, short, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// SQLite database path, overrides the settings file and DATABASE_PATH
    #[arg(long, short)]
    database: Option<String>,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env file
    let _ = dotenv::dotenv();

    let log_config = if cli.verbose {
        logging::LogConfig::verbose()
    } else {
        logging::LogConfig::default()
    };
    logging::init_logging(&log_config)?;

    let mut settings = Settings::load(&cli.config, |key| std::env::var(key).ok())
        .with_context(|| format!("failed to load settings from {}", cli.config.display()))?;
    if let Some(path) = cli.database {
        settings.database.path = path;
    }
    settings.validate()?;

    let gateway = Gateway::connect(&settings).context("failed to open the database")?;
    log::info!(
        "Connected to {} (create policy: {})",
        settings.database.path,
        settings.gateway.create_policy.as_str()
    );

    let mut app = App::new(gateway, &settings.ui);
    app.log_config = log_config;

    let mut tui = terminal::init()?;
    let result = run(&mut tui, &mut app);
    terminal::restore()?;

    if let Err(e) = &result {
        log::error!("Exiting on error: {:#}", e);
    }
    result
}

/// Main event loop: refresh timer, status expiry, draw, then one key
fn run(tui: &mut terminal::Tui, app: &mut App) -> Result<()> {
    while app.running {
        let now = Instant::now();
        app.refresh_if_due(now);
        app.clear_expired_status(now);

        tui.draw(|frame| ui::render(app, frame))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key_event(key)?;
                }
            }
        }
    }

    log::info!("Quit requested");
    Ok(())
}
