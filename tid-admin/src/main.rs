use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tid_store::config::CONFIG_FILE;
use tid_store::{Gateway, Settings};
use tid_types::{CreatePolicy, NewPost, WeekDay};

/// TID maintenance utility
///
/// Works directly on the scheduling database: set it up, list and prune
/// posts, record runs and look at what is stored.
#[derive(Parser, Debug)]
#[command(name = "tid-admin")]
#[command(about = "Maintenance commands for the tid scheduling database", long_about = None)]
#[command(version)]
struct Args {
    /// Settings file (optional; defaults and environment fill the rest)
    #[arg(short, long, default_value = CONFIG_FILE, global = true)]
    config: PathBuf,

    /// SQLite database path, overrides the settings file and DATABASE_PATH
    #[arg(short, long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create missing tables and seed the lookup tables
    Init,

    /// List scheduled posts
    Posts {
        #[arg(long)]
        json: bool,
    },

    /// List recorded runs
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Delete a post and everything attached to it
    Delete { id: i64 },

    /// Schedule a new post
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        text: String,

        #[arg(long)]
        random: bool,

        /// Media file to attach (repeatable)
        #[arg(long = "media", value_name = "PATH")]
        media: Vec<PathBuf>,

        /// Week day name (repeatable)
        #[arg(long = "day", value_name = "DAY")]
        days: Vec<String>,

        /// Local time of day, HH:MM (repeatable)
        #[arg(long = "time", value_name = "HH:MM")]
        times: Vec<String>,

        /// Roll everything back if any attachment fails
        #[arg(long)]
        atomic: bool,
    },

    /// Store one execution record for a post
    RecordStat {
        post_id: i64,
        day: String,
        status: String,

        /// Run time as RFC 3339, defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// Show table row counts and lookup sizes
    Inspect,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tid_store=info,tid_admin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _ = dotenv::dotenv();
    init_tracing();

    let mut settings = Settings::load(&args.config, |key| std::env::var(key).ok())
        .with_context(|| format!("Failed to load settings from {}", args.config.display()))?;
    if let Some(path) = args.database {
        settings.database.path = path;
    }
    settings.validate()?;

    let gateway = Gateway::connect(&settings)
        .with_context(|| format!("Failed to open database {}", settings.database.path))?;
    tracing::debug!(command = ?args.command, "running");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&gateway, args.command, &settings.database.path, &mut out)
}

/// Execute one subcommand against an open gateway.
fn run<Tz: TimeZone>(
    gateway: &Gateway<Tz>,
    command: Command,
    db_path: &str,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Init => init(gateway, db_path, out),
        Command::Posts { json } => list_posts(gateway, json, out),
        Command::Stats { json } => list_stats(gateway, json, out),
        Command::Delete { id } => delete(gateway, id, out),
        Command::Add {
            name,
            text,
            random,
            media,
            days,
            times,
            atomic,
        } => {
            let post = NewPost {
                name,
                text,
                is_random: random,
                media_paths: media,
                week_days: days,
                times,
            };
            add(gateway, &post, atomic, out).map(|_| ())
        }
        Command::RecordStat {
            post_id,
            day,
            status,
            at,
        } => {
            let day = WeekDay::parse(&day)
                .with_context(|| format!("Unknown week day '{}'", day))?;
            let run_at = match at {
                Some(value) => parse_run_at(&value)?,
                None => Utc::now(),
            };
            record_stat(gateway, post_id, run_at, day, &status, out)
        }
        Command::Inspect => inspect(gateway, out),
    }
}

fn parse_run_at(value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid --at '{}', expected RFC 3339", value))?;
    Ok(parsed.with_timezone(&Utc))
}

fn init<Tz: TimeZone>(gateway: &Gateway<Tz>, path: &str, out: &mut impl Write) -> Result<()> {
    let days = gateway.week_days().context("Failed to read week days")?;
    let slots = gateway.time_slots().context("Failed to read time slots")?;
    writeln!(out, "Database ready: {}", path)?;
    writeln!(out, "  week days:  {}", days.len())?;
    writeln!(out, "  time slots: {}", slots.len())?;
    Ok(())
}

fn list_posts<Tz: TimeZone>(gateway: &Gateway<Tz>, json: bool, out: &mut impl Write) -> Result<()> {
    let posts = gateway.list_posts().context("Failed to list posts")?;
    if json {
        serde_json::to_writer_pretty(&mut *out, &posts)?;
        writeln!(out)?;
        return Ok(());
    }
    if posts.is_empty() {
        writeln!(out, "No posts scheduled")?;
        return Ok(());
    }
    for post in &posts {
        writeln!(
            out,
            "{:>4}  {}  random={}  days=[{}]  times=[{}]  media={}",
            post.id,
            post.name,
            post.is_random,
            post.week_days.join(", "),
            post.tweet_times.join(", "),
            post.media_files.len()
        )?;
    }
    Ok(())
}

fn list_stats<Tz: TimeZone>(gateway: &Gateway<Tz>, json: bool, out: &mut impl Write) -> Result<()> {
    let stats = gateway.list_stats().context("Failed to list stats")?;
    if json {
        serde_json::to_writer_pretty(&mut *out, &stats)?;
        writeln!(out)?;
        return Ok(());
    }
    if stats.is_empty() {
        writeln!(out, "No runs recorded")?;
        return Ok(());
    }
    for stat in &stats {
        writeln!(
            out,
            "{:>4}  {}  {} {} ({})  {}",
            stat.id, stat.post_name, stat.date, stat.time, stat.day_name, stat.status
        )?;
    }
    Ok(())
}

fn delete<Tz: TimeZone>(gateway: &Gateway<Tz>, id: i64, out: &mut impl Write) -> Result<()> {
    gateway
        .delete_post(id)
        .with_context(|| format!("Failed to delete post {}", id))?;
    tracing::info!(post_id = id, "deleted from the command line");
    writeln!(out, "Deleted post {}", id)?;
    Ok(())
}

fn add<Tz: TimeZone>(
    gateway: &Gateway<Tz>,
    post: &NewPost,
    atomic: bool,
    out: &mut impl Write,
) -> Result<i64> {
    let result = if atomic {
        gateway
            .clone()
            .with_policy(CreatePolicy::AllOrNothing)
            .create_post(post)
    } else {
        gateway.create_post(post)
    };
    let created = result.with_context(|| format!("Failed to create post '{}'", post.name))?;
    tracing::info!(
        post_id = created.id,
        atomic,
        skipped = created.skipped.len(),
        "created from the command line"
    );

    writeln!(out, "Created post {}", created.id)?;
    for item in &created.skipped {
        writeln!(out, "  skipped {}", item)?;
    }
    Ok(created.id)
}

fn record_stat<Tz: TimeZone>(
    gateway: &Gateway<Tz>,
    post_id: i64,
    run_at: DateTime<Utc>,
    day: WeekDay,
    status: &str,
    out: &mut impl Write,
) -> Result<()> {
    let id = gateway
        .record_stat(post_id, run_at, day, status)
        .with_context(|| format!("Failed to record a run for post {}", post_id))?;
    tracing::info!(post_id, stat_id = id, status, "run recorded");
    writeln!(out, "Recorded run {} for post {}", id, post_id)?;
    Ok(())
}

fn inspect<Tz: TimeZone>(gateway: &Gateway<Tz>, out: &mut impl Write) -> Result<()> {
    let counts = gateway.table_counts().context("Failed to count rows")?;
    writeln!(out, "Tables:")?;
    for (table, count) in &counts {
        writeln!(out, "  {:<16} {}", table, count)?;
    }

    let days = gateway.week_days()?;
    let slots = gateway.time_slots()?;
    let names: Vec<&str> = days.iter().map(|(_, name)| name.as_str()).collect();
    writeln!(out, "Week days: {}", names.join(", "))?;
    match (slots.first(), slots.last()) {
        (Some((_, first)), Some((_, last))) => {
            writeln!(out, "Time slots: {} ({} .. {} UTC)", slots.len(), first, last)?
        }
        _ => writeln!(out, "Time slots: none")?,
    }
    Ok(())
}
