//! Runtime configuration loaded from environment variables.
//!
//! Every knob has a typed default, so a missing or unparseable variable
//! falls back silently rather than failing startup.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use reqwest::Url;
use tracing::warn;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 1500;
const DEFAULT_SAVE_TIMEOUT_MS: u64 = 10_000;

/// Endpoints and timings for one sync client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncConfig {
    /// HTTP base URL of the canvas service; the websocket URL is derived from it.
    pub base_url: String,
    /// Quiet period after the last change before a snapshot is written.
    pub save_debounce: Duration,
    /// Request timeout for load and save calls.
    pub save_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            save_debounce: Duration::from_millis(DEFAULT_SAVE_DEBOUNCE_MS),
            save_timeout: Duration::from_millis(DEFAULT_SAVE_TIMEOUT_MS),
        }
    }
}

impl SyncConfig {
    /// Read `SKETCH_BASE_URL`, `SKETCH_SAVE_DEBOUNCE_MS`, and `SKETCH_SAVE_TIMEOUT_MS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("SKETCH_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned()),
            save_debounce: Duration::from_millis(env_parse("SKETCH_SAVE_DEBOUNCE_MS", DEFAULT_SAVE_DEBOUNCE_MS)),
            save_timeout: Duration::from_millis(env_parse("SKETCH_SAVE_TIMEOUT_MS", DEFAULT_SAVE_TIMEOUT_MS)),
        }
    }

    /// Replace the base URL, e.g. from a command-line flag.
    #[must_use]
    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..self }
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn http_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Websocket URL for the sync channel of `canvas_id`. The canvas id and
    /// token are percent-encoded.
    ///
    /// Returns `None` when the base URL is not `http://` or `https://`, or
    /// does not parse.
    #[must_use]
    pub fn ws_url(&self, canvas_id: &str, token: &str) -> Option<String> {
        let base = self.http_base();
        let (scheme, rest) = if let Some(rest) = base.strip_prefix("http://") {
            ("ws", rest)
        } else if let Some(rest) = base.strip_prefix("https://") {
            ("wss", rest)
        } else {
            return None;
        };
        let mut url = match Url::parse(&format!("{scheme}://{rest}")) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, base_url = %self.base_url, "base URL does not parse");
                return None;
            }
        };
        {
            let Ok(mut segments) = url.path_segments_mut() else {
                return None;
            };
            segments.pop_if_empty().extend(["ws", "canvas", canvas_id]);
        }
        url.query_pairs_mut().append_pair("token", token);
        Some(url.into())
    }
}

/// Parse an environment variable, falling back to `default` when it is unset
/// or does not parse.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
