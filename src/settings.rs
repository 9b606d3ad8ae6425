use nba_api::ClientConfig;
use std::time::Duration;

pub const STATS_URL_VAR: &str = "NBASTATS_STATS_URL";
pub const LIVE_URL_VAR: &str = "NBASTATS_LIVE_URL";
pub const TIMEOUT_VAR: &str = "NBASTATS_TIMEOUT_SECS";
pub const LOG_VAR: &str = "NBASTATS_LOG";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Everything the binary reads from its environment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub stats_url: Option<String>,
    pub live_url: Option<String>,
    pub timeout: Option<Duration>,
    pub log_filter: Option<String>,
}

impl AppSettings {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout = match non_empty(TIMEOUT_VAR) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("{TIMEOUT_VAR} must be a whole number of seconds, got {raw:?}"))?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            stats_url: non_empty(STATS_URL_VAR),
            live_url: non_empty(LIVE_URL_VAR),
            timeout,
            log_filter: non_empty(LOG_VAR).or_else(|| non_empty("RUST_LOG")),
        })
    }

    pub fn stats_config(&self) -> ClientConfig {
        self.apply(ClientConfig::stats(), self.stats_url.as_deref())
    }

    pub fn live_config(&self) -> ClientConfig {
        self.apply(ClientConfig::live(), self.live_url.as_deref())
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    fn apply(&self, mut config: ClientConfig, base_url: Option<&str>) -> ClientConfig {
        if let Some(url) = base_url {
            config = config.with_base_url(url);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        config
    }
}
