//! Tracing subscriber setup.
//!
//! Library code only emits `tracing` events. An embedding program picks an
//! output format once; the filter comes from `RUST_LOG`, falling back to
//! `revscope=info`.

use std::str::FromStr;
use std::sync::Once;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::error::RevscopeError;

const DEFAULT_DIRECTIVE: &str = "revscope=info";

static INIT: Once = Once::new();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines with source locations.
    #[default]
    Pretty,
    /// One JSON object per event, including the current span.
    Json,
}

impl FromStr for LogFormat {
    type Err = RevscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(RevscopeError::InvalidInput(format!("unknown log format: {other}"))),
        }
    }
}

/// Install the global subscriber. Only the first call in a process has any
/// effect, and a subscriber installed by the host program is left alone.
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
        let registry = tracing_subscriber::registry().with(filter);

        let installed = match format {
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .with_span_events(FmtSpan::CLOSE)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .try_init(),
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_span_events(FmtSpan::CLOSE)
                        .with_current_span(true),
                )
                .try_init(),
        };

        if installed.is_ok() {
            info!(format = ?format, "revscope logging initialized");
        }
    });
}

pub fn init_tracing() {
    init_logging(LogFormat::Pretty);
}

pub fn init_tracing_json() {
    init_logging(LogFormat::Json);
}
