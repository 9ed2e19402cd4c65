//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Browser session settings
    #[serde(default)]
    pub browser: BrowserSettings,

    /// Interception and capture-polling behavior
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Image download settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Batch processing limits
    #[serde(default)]
    pub batch: BatchConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.browser.user_agent.trim().is_empty() {
            return Err(AppError::validation("browser.user_agent is empty"));
        }
        url::Url::parse(&self.browser.base_url)
            .map_err(|e| AppError::validation(format!("browser.base_url: {e}")))?;
        if self.capture.allow_patterns.is_empty() {
            return Err(AppError::validation("capture.allow_patterns is empty"));
        }
        if self.capture.poll_interval_ms == 0 {
            return Err(AppError::validation("capture.poll_interval_ms must be > 0"));
        }
        for (name, value) in [
            ("capture.posts_timeout_ms", self.capture.posts_timeout_ms),
            ("capture.highlights_timeout_ms", self.capture.highlights_timeout_ms),
            ("capture.carousel_timeout_ms", self.capture.carousel_timeout_ms),
        ] {
            if value < self.capture.poll_interval_ms {
                return Err(AppError::validation(format!(
                    "{name} must be >= capture.poll_interval_ms"
                )));
            }
        }
        if self.capture.login_wall_selector.trim().is_empty() {
            return Err(AppError::validation("capture.login_wall_selector is empty"));
        }
        if self.download.timeout_secs == 0 {
            return Err(AppError::validation("download.timeout_secs must be > 0"));
        }
        if self.download.max_attempts == 0 {
            return Err(AppError::validation("download.max_attempts must be > 0"));
        }
        if self.paths.output_dir.trim().is_empty() {
            return Err(AppError::validation("paths.output_dir is empty"));
        }
        Ok(())
    }
}

/// Headless browser session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    /// User-Agent reported by the page
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Run without a visible window
    #[serde(default = "defaults::headless")]
    pub headless: bool,

    #[serde(default = "defaults::window_width")]
    pub window_width: u32,

    #[serde(default = "defaults::window_height")]
    pub window_height: u32,

    /// Site root used to build post and reel URLs
    #[serde(default = "defaults::base_url")]
    pub base_url: String,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            headless: defaults::headless(),
            window_width: defaults::window_width(),
            window_height: defaults::window_height(),
            base_url: defaults::base_url(),
        }
    }
}

/// Interception allow-list and polling windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// URL substrings worth decoding; everything else is dropped unread
    #[serde(default = "defaults::allow_patterns")]
    pub allow_patterns: Vec<String>,

    /// Delay between capture-store polls
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(default = "defaults::posts_timeout")]
    pub posts_timeout_ms: u64,

    #[serde(default = "defaults::highlights_timeout")]
    pub highlights_timeout_ms: u64,

    #[serde(default = "defaults::carousel_timeout")]
    pub carousel_timeout_ms: u64,

    /// Wait after the profile page loads before draining captures
    #[serde(default = "defaults::profile_settle")]
    pub profile_settle_ms: u64,

    /// Extra per-profile delay on top of the settle time
    #[serde(default = "defaults::load_delay")]
    pub load_delay_ms: u64,

    /// Wait after each post navigation
    #[serde(default = "defaults::post_settle")]
    pub post_settle_ms: u64,

    /// Element whose presence means the platform wants a login
    #[serde(default = "defaults::login_wall_selector")]
    pub login_wall_selector: String,
}

impl CaptureConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn posts_timeout(&self) -> Duration {
        Duration::from_millis(self.posts_timeout_ms)
    }

    pub fn highlights_timeout(&self) -> Duration {
        Duration::from_millis(self.highlights_timeout_ms)
    }

    pub fn carousel_timeout(&self) -> Duration {
        Duration::from_millis(self.carousel_timeout_ms)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            allow_patterns: defaults::allow_patterns(),
            poll_interval_ms: defaults::poll_interval(),
            posts_timeout_ms: defaults::posts_timeout(),
            highlights_timeout_ms: defaults::highlights_timeout(),
            carousel_timeout_ms: defaults::carousel_timeout(),
            profile_settle_ms: defaults::profile_settle(),
            load_delay_ms: defaults::load_delay(),
            post_settle_ms: defaults::post_settle(),
            login_wall_selector: defaults::login_wall_selector(),
        }
    }
}

/// Image download behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::download_timeout")]
    pub timeout_secs: u64,

    /// Delay between downloads in milliseconds
    #[serde(default = "defaults::download_delay")]
    pub request_delay_ms: u64,

    /// Attempts per image, including the first
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Backoff unit; attempt `n` waits `n * retry_base_ms`
    #[serde(default = "defaults::retry_base")]
    pub retry_base_ms: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::download_timeout(),
            request_delay_ms: defaults::download_delay(),
            max_attempts: defaults::max_attempts(),
            retry_base_ms: defaults::retry_base(),
        }
    }
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the per-profile output tree
    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
        }
    }
}

/// Batch limits for the diff-then-scrape pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of profiles processed per pipeline run
    #[serde(default = "defaults::batch_limit")]
    pub limit: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            limit: defaults::batch_limit(),
        }
    }
}

mod defaults {
    // Browser defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36".into()
    }
    pub fn headless() -> bool {
        true
    }
    pub fn window_width() -> u32 {
        1280
    }
    pub fn window_height() -> u32 {
        900
    }
    pub fn base_url() -> String {
        "https://www.instagram.com".into()
    }

    // Capture defaults
    pub fn allow_patterns() -> Vec<String> {
        vec![
            "/api/v1/users/web_profile_info".into(),
            "/api/graphql".into(),
            "/graphql/query".into(),
            "/api/v1/highlights/".into(),
            "/api/v1/feed/reels_tray".into(),
            "/api/v1/feed/reels_media".into(),
            "/api/v1/media/".into(),
            "/api/v1/clips/".into(),
            "/api/v1/media/shortcode/".into(),
        ]
    }
    pub fn poll_interval() -> u64 {
        400
    }
    pub fn posts_timeout() -> u64 {
        25_000
    }
    pub fn highlights_timeout() -> u64 {
        20_000
    }
    pub fn carousel_timeout() -> u64 {
        5_000
    }
    pub fn profile_settle() -> u64 {
        3_000
    }
    pub fn load_delay() -> u64 {
        800
    }
    pub fn post_settle() -> u64 {
        800
    }
    pub fn login_wall_selector() -> String {
        r#"input[name="username"]"#.into()
    }

    // Download defaults
    pub fn download_timeout() -> u64 {
        30
    }
    pub fn download_delay() -> u64 {
        200
    }
    pub fn max_attempts() -> u32 {
        5
    }
    pub fn retry_base() -> u64 {
        1_000
    }

    // Path defaults
    pub fn output_dir() -> String {
        "profile".into()
    }

    // Batch defaults
    pub fn batch_limit() -> usize {
        3
    }
}
