use std::env;
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};
use url::Url;

use crate::worker::progress::ProgressMode;

pub const DEFAULT_MODEL_SERVICE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_MODEL_NAME: &str = "csebuetnlp/mT5_multilingual_XLSum";

/// `0` switches `getUpdates` to short polling.
const POLL_TIMEOUT_RANGE: RangeInclusive<u64> = 0..=300;
/// Must be non-zero so a failing `getUpdates` is never retried in a tight loop.
const POLL_RETRY_DELAY_RANGE: RangeInclusive<u64> = 1..=3600;
const MODEL_TIMEOUT_RANGE: RangeInclusive<u64> = 1..=86_400;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram_bot_token: String,
    pub model_service_url: Url,
    pub model_service_token: Option<String>,
    pub model_name: String,
    pub model_timeout: Duration,
    pub progress_mode: ProgressMode,
    pub poll_timeout_secs: u64,
    pub poll_retry_delay: Duration,
    pub max_concurrent_summaries: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Like [`Self::from_env`], after loading `path` (or the nearest `.env` when `None`)
    /// into the process environment.
    ///
    /// Variables already set in the environment win over the file. A missing file is not
    /// an error; an unreadable one is logged and skipped.
    pub fn from_env_file(path: Option<&Path>) -> Result<Self, String> {
        let loaded = match path {
            Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
            None => dotenvy::dotenv(),
        };
        match loaded {
            Ok(file) => info!(path = %file.display(), "Loaded environment file"),
            Err(e) if e.not_found() => {}
            Err(e) => warn!("Ignoring environment file: {}", e),
        }
        Self::from_env()
    }

    /// Build the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_source<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let telegram_bot_token =
            get("TELEGRAM_BOT_TOKEN").ok_or_else(|| "TELEGRAM_BOT_TOKEN: not set".to_string())?;

        let raw_url = get("MODEL_SERVICE_URL").unwrap_or_else(|| DEFAULT_MODEL_SERVICE_URL.into());
        let model_service_url =
            Url::parse(&raw_url).map_err(|e| format!("MODEL_SERVICE_URL: {}", e))?;

        let progress_mode = match get("PROGRESS_MODE") {
            Some(raw) => raw.parse::<ProgressMode>()?,
            None => ProgressMode::default(),
        };

        let max_concurrent_summaries = parse_number(&get, "MAX_CONCURRENT_SUMMARIES", 4)?;
        if max_concurrent_summaries == 0 {
            return Err("MAX_CONCURRENT_SUMMARIES: must be at least 1".to_string());
        }

        Ok(Self {
            telegram_bot_token,
            model_service_url,
            model_service_token: get("MODEL_SERVICE_TOKEN"),
            model_name: get("MODEL_NAME").unwrap_or_else(|| DEFAULT_MODEL_NAME.into()),
            model_timeout: Duration::from_secs(parse_in_range(
                &get,
                "MODEL_TIMEOUT_SECS",
                300,
                MODEL_TIMEOUT_RANGE,
            )?),
            progress_mode,
            poll_timeout_secs: parse_in_range(&get, "POLL_TIMEOUT_SECS", 30, POLL_TIMEOUT_RANGE)?,
            poll_retry_delay: Duration::from_secs(parse_in_range(
                &get,
                "POLL_RETRY_DELAY_SECS",
                5,
                POLL_RETRY_DELAY_RANGE,
            )?),
            max_concurrent_summaries: usize::try_from(max_concurrent_summaries)
                .map_err(|e| format!("MAX_CONCURRENT_SUMMARIES: {}", e))?,
        })
    }
}

fn parse_in_range<G>(
    get: &G,
    key: &str,
    default: u64,
    range: RangeInclusive<u64>,
) -> Result<u64, String>
where
    G: Fn(&str) -> Option<String>,
{
    let value = parse_number(get, key, default)?;
    if !range.contains(&value) {
        return Err(format!(
            "{}: {} is outside {}..={}",
            key,
            value,
            range.start(),
            range.end()
        ));
    }
    Ok(value)
}

fn parse_number<G>(get: &G, key: &str, default: u64) -> Result<u64, String>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("{}: {}", key, e)),
        None => Ok(default),
    }
}
