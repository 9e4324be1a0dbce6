use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};

use biomon::configuration::config::Config;
use biomon::login::LoginAttemptLog;
use biomon::session_management::SessionStore;
use biomon::storage::Database;

#[derive(Parser)]
#[command(name = "biomon")]
#[command(version = "0.1.0")]
#[command(about = "Behavioral telemetry store and login anomaly detector")]
struct Args {
    config_file: String,

    /// Show the most recent login attempts for this user
    #[arg(long)]
    user: Option<String>,

    /// How many attempts to show with --user
    #[arg(long, default_value_t = 10)]
    limit: u32,
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    let args = Args::parse();

    let config = Config::from_file(Path::new(args.config_file.as_str())).unwrap_or_else(|e| {
        error!("Unable to import configuration from file: {}", e);
        std::process::exit(1);
    });

    // Storage initialization failure is fatal; nothing can run without it.
    let db = Database::open(&config.database_path, config.op_timeout()).unwrap_or_else(|e| {
        error!("Unable to open the database: {}, exiting...", e);
        std::process::exit(1);
    });
    let db = Arc::new(db);

    let sessions = SessionStore::new(Arc::clone(&db));
    match sessions.list_active() {
        Ok(active) => {
            info!("{} active session(s)", active.len());
            for session in active {
                println!(
                    "session {} started {} ({})",
                    session.id,
                    session.start_time.to_rfc3339(),
                    session.notes.as_deref().unwrap_or("no notes")
                );
            }
        }
        Err(e) => {
            error!("Unable to list active sessions: {}", e);
            std::process::exit(1);
        }
    }

    if let Some(user) = args.user {
        let attempts = LoginAttemptLog::new(Arc::clone(&db));
        match attempts.recent(&user, args.limit) {
            Ok(recent) => {
                info!("{} recorded attempt(s) for '{}'", recent.len(), user);
                for attempt in recent {
                    println!(
                        "{} success={} suspicious={} {}",
                        attempt.attempt_time.to_rfc3339(),
                        attempt.success,
                        attempt.is_suspicious,
                        attempt.reason.as_deref().unwrap_or("-")
                    );
                }
            }
            Err(e) => {
                error!("Unable to read login attempts for '{}': {}", user, e);
                std::process::exit(1);
            }
        }
    }
}
