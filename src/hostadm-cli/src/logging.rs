//! Console logging setup.
//!
//! Logs go to stderr without timestamps so stdout only carries command
//! output.

/// Log verbosity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<LogLevel> {
        match s.to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    /// `-v` wins, then `HOSTADM_LOG_LEVEL`, then the default.
    pub fn select(verbose: bool, env_level: Option<&str>) -> LogLevel {
        if verbose {
            return LogLevel::Debug;
        }
        env_level
            .and_then(LogLevel::from_str_loose)
            .unwrap_or_default()
    }
}

/// Install the stderr subscriber. `RUST_LOG`, when set, replaces the level
/// filter entirely.
pub fn init(verbose: bool) {
    let env_level = std::env::var("HOSTADM_LOG_LEVEL").ok();
    let level = LogLevel::select(verbose, env_level.as_deref());

    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !verbose => directives,
        _ => level.as_filter_str().to_string(),
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();

    if installed.is_err() {
        tracing::debug!("Logging already initialised");
    }
}
