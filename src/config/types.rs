use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Koradi-Archiver
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub output: OutputConfig,
    pub events: EventsConfig,
}

/// HTTP client behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Maximum time to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Deadline for a complete listing page fetch (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Maximum silence between two body chunks of an archive download (seconds)
    #[serde(rename = "read-timeout-secs")]
    pub read_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("koradi-archiver/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            read_timeout_secs: 60,
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for the per-language folders.
    /// Defaults to the directory containing the executable.
    pub directory: Option<PathBuf>,

    /// Where to write a markdown report of the run, if anywhere
    #[serde(rename = "summary-path")]
    pub summary_path: Option<PathBuf>,

    /// Leave partially written archives on disk when a transfer fails
    #[serde(rename = "keep-partial-files")]
    pub keep_partial_files: bool,
}

/// Event channel configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Capacity of the bounded progress/log channel
    #[serde(rename = "channel-capacity")]
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}
