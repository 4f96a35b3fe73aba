//! Configuration for a consent flow.
//!
//! Loaded from TOML, then overridden by `CONSENTUI_*` environment variables.

use crate::error::ConfigError;
use crate::presenter::ConsentPrompt;
use crate::region::{FixedRegion, PosixLocaleSource, RegionCode, RegionSource};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Region override. A blank value, here or as `region = ""` in the file, means
/// "not set" and leaves the region to the platform locale.
pub const ENV_REGION: &str = "CONSENTUI_REGION";
pub const ENV_TRACKING_DELAY_MS: &str = "CONSENTUI_TRACKING_DELAY_MS";

/// Delay before the tracking prompt, so it does not race the host UI becoming active.
pub const DEFAULT_TRACKING_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsentConfig {
    /// Region override. `None` means "ask the platform locale".
    #[serde(deserialize_with = "blank_region_is_unset")]
    pub region: Option<RegionCode>,
    pub tracking_delay_ms: u64,
    pub prompt: ConsentPrompt,
}

fn blank_region_is_unset<'de, D>(deserializer: D) -> Result<Option<RegionCode>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => RegionCode::parse(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            region: None,
            tracking_delay_ms: DEFAULT_TRACKING_DELAY_MS,
            prompt: ConsentPrompt::default(),
        }
    }
}

impl ConsentConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "Loaded consent config");
        Ok(config)
    }

    /// Apply `CONSENTUI_*` overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(region) = non_empty(ENV_REGION) {
            self.region = Some(RegionCode::parse(&region)?);
        }
        if let Some(delay) = non_empty(ENV_TRACKING_DELAY_MS) {
            self.tracking_delay_ms = delay.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_TRACKING_DELAY_MS,
                value: delay.clone(),
            })?;
        }
        Ok(self)
    }

    pub fn tracking_delay(&self) -> Duration {
        Duration::from_millis(self.tracking_delay_ms)
    }

    /// The override when set, otherwise the POSIX locale.
    pub fn region_source(&self) -> Arc<dyn RegionSource> {
        match self.region {
            Some(code) => Arc::new(FixedRegion::new(code.as_str())),
            None => Arc::new(PosixLocaleSource),
        }
    }
}
