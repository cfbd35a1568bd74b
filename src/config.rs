use crate::gateway::{
    GradingService, HttpGradingService, MockGradingService, OfflineGradingService,
};
use anyhow::{anyhow, bail, Context};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceMode {
    Http,
    Mock,
    Offline,
}

impl ServiceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceMode::Http => "http",
            ServiceMode::Mock => "mock",
            ServiceMode::Offline => "offline",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Some(ServiceMode::Http),
            "mock" => Some(ServiceMode::Mock),
            "offline" | "none" => Some(ServiceMode::Offline),
            _ => None,
        }
    }
}

/// Runtime settings, read from `GRADINGD_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub service: ServiceMode,
    pub service_url: Option<String>,
    pub timeout: Duration,
    pub roster: Option<PathBuf>,
    pub log_level: Level,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let service_url = get("GRADINGD_SERVICE_URL");
        let service = match get("GRADINGD_SERVICE") {
            Some(raw) => ServiceMode::parse(&raw).ok_or_else(|| {
                anyhow!("GRADINGD_SERVICE must be one of: http, mock, offline (got {raw:?})")
            })?,
            None if service_url.is_some() => ServiceMode::Http,
            None => ServiceMode::Offline,
        };
        if service == ServiceMode::Http && service_url.is_none() {
            bail!("GRADINGD_SERVICE=http requires GRADINGD_SERVICE_URL");
        }

        let timeout = match get("GRADINGD_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw
                    .parse::<u64>()
                    .with_context(|| format!("GRADINGD_TIMEOUT_SECS is not a number: {raw:?}"))?;
                if secs == 0 {
                    bail!("GRADINGD_TIMEOUT_SECS must be positive");
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let log_level = match get("GRADINGD_LOG") {
            Some(raw) => raw
                .parse::<Level>()
                .map_err(|_| anyhow!("GRADINGD_LOG is not a log level: {raw:?}"))?,
            None => Level::INFO,
        };

        Ok(Self {
            service,
            service_url,
            timeout,
            roster: get("GRADINGD_ROSTER").map(PathBuf::from),
            log_level,
        })
    }

    pub fn build_service(&self) -> anyhow::Result<Box<dyn GradingService>> {
        Ok(match self.service {
            ServiceMode::Http => {
                let url = self
                    .service_url
                    .as_deref()
                    .ok_or_else(|| anyhow!("no grading service URL configured"))?;
                Box::new(HttpGradingService::new(url, self.timeout)?)
            }
            ServiceMode::Mock => Box::new(MockGradingService),
            ServiceMode::Offline => Box::new(OfflineGradingService),
        })
    }
}
