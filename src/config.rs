//! Runtime configuration, loaded from environment variables at startup.

use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

/// Settings shared by the server and the terminal client.
///
/// Every field has a default so both binaries run without any environment
/// variables set. Call `dotenvy::dotenv()` before [`Config::from_env`] to pick
/// up a `.env` file.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the server binds (`FAQ_CHAT_BIND`).
    pub bind_address: String,

    /// sqlx SQLite URL of the FAQ store (`FAQ_CHAT_DATABASE_URL`).
    pub database_url: String,

    /// Load the bundled seed rows into an empty store (`FAQ_CHAT_SEED`).
    pub seed_fixtures: bool,

    /// Extra SQL script executed after seeding (`FAQ_CHAT_FIXTURE`).
    pub extra_fixture: Option<PathBuf>,

    /// Pause between streamed reply chunks (`FAQ_CHAT_STREAM_DELAY_MS`).
    pub stream_delay: Duration,

    /// Full URL of the `/chat` endpoint used by the client (`FAQ_CHAT_ENDPOINT`).
    pub chat_endpoint: String,

    /// `tracing` filter used when `RUST_LOG` is unset (`FAQ_CHAT_LOG`).
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("FAQ_CHAT_BIND", "0.0.0.0:3000"),
            database_url: env_or("FAQ_CHAT_DATABASE_URL", "sqlite://data.db"),
            seed_fixtures: std::env::var("FAQ_CHAT_SEED")
                .map(|v| parse_bool(&v))
                .unwrap_or(true),
            extra_fixture: std::env::var("FAQ_CHAT_FIXTURE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            stream_delay: Duration::from_millis(parse_env("FAQ_CHAT_STREAM_DELAY_MS", 25)),
            chat_endpoint: env_or("FAQ_CHAT_ENDPOINT", "http://localhost:3000/chat"),
            log_level: env_or("FAQ_CHAT_LOG", "info"),
        }
    }
}

/// Install the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `default_filter`; an unparsable filter falls back to `info`.
pub fn init_tracing(default_filter: &str) {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match default_filter.parse::<EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!("WARN: '{default_filter}' is not a valid tracing filter ({e}); falling back to 'info'");
                EnvFilter::new("info")
            }
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_bool(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes")
}
