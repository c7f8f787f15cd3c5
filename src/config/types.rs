use serde::Deserialize;

/// Listing crawled when no `base-url` is configured
pub const DEFAULT_BASE_URL: &str = "https://movie.douban.com/top250";

/// Pause between consecutive requests; shorter pauses get the client blocked
pub const DEFAULT_PAUSE_MILLIS: u64 = 15_000;

/// Output file written when no path is configured
pub const DEFAULT_CSV_PATH: &str = "douban_movie.csv";

/// Desktop browser identification; the listing serves different content to
/// default client identifiers
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Listing URL; pages are addressed with a `start` offset query parameter
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Pause after every catalog page and before every detail fetch (milliseconds)
    #[serde(rename = "pause-millis")]
    pub pause_millis: u64,

    /// 1-based page to start from; 1 overwrites the output, 2..=10 appends
    #[serde(rename = "resume-page")]
    pub resume_page: u32,

    /// Use catalog-page credits only, skipping detail pages
    #[serde(rename = "fast-mode")]
    pub fast_mode: bool,

    /// Total time allowed for one request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Extra attempts for a failed catalog page fetch; 0 aborts on first failure
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// First retry delay, doubled on each further attempt (milliseconds)
    #[serde(rename = "retry-backoff-millis")]
    pub retry_backoff_millis: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            pause_millis: DEFAULT_PAUSE_MILLIS,
            resume_page: 1,
            fast_mode: false,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 0,
            retry_backoff_millis: 30_000,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Full User-Agent header value sent with every request
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the CSV file
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Column names written in the header row
    pub header: HeaderStyle,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: DEFAULT_CSV_PATH.to_string(),
            header: HeaderStyle::default(),
        }
    }
}

/// Language of the header row; column order is identical for both
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStyle {
    #[default]
    English,
    Chinese,
}
