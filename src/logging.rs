//! Log setup for the CLI.
//!
//! `RUST_LOG` wins when set. Otherwise `-v` flags pick the level:
//! `info` by default, chainstamp debug with `-v`, everything at debug
//! with `-vv`. Events go to stderr so stdout carries only command results.

use tracing_subscriber::{fmt, EnvFilter};

/// Selects the output format; `json` or `1`/`true` (legacy) mean JSON lines.
pub const FORMAT_ENV: &str = "CHAINSTAMP_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") || v == "1" || v.eq_ignore_ascii_case("true") => {
                LogFormat::Json
            }
            _ => LogFormat::Compact,
        }
    }

    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(FORMAT_ENV).ok().as_deref())
    }
}

pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "info,chainstamp=debug",
        _ => "debug",
    }
}

fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(verbosity: u8) {
    let filter = env_filter(verbosity);
    let builder = fmt::Subscriber::builder().with_env_filter(filter).with_writer(std::io::stderr);
    let _ = match LogFormat::from_env() {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().with_target(false).try_init(),
    };
}
