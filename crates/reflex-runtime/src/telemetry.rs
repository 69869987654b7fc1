//! Tracing initialisation for the agent process.
//!
//! Call [`init_tracing`] once at startup. Everything the agent reports –
//! ingested payloads, fired rules, dispatched actions, send failures – goes
//! through the `tracing` macros, so the subscriber configured here is the
//! whole observability surface.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `REFLEX_LOG_FORMAT=json` | Emit newline-delimited JSON logs. |

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Wire format of console log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    /// Resolve the format from `REFLEX_LOG_FORMAT`.
    pub fn from_env() -> Self {
        if std::env::var("REFLEX_LOG_FORMAT").as_deref() == Ok("json") {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Respects `RUST_LOG` for filtering (default `info`) and
/// `REFLEX_LOG_FORMAT=json` for newline-delimited JSON output. Must be
/// called at most once per process; a second call panics because the global
/// subscriber is already set.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match LogFormat::from_env() {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .init(),
    }
}
