//! Config resolution shared by every command

use anyhow::{Context, Result};
use consentui_core::config::ConsentConfig;
use consentui_core::region::RegionCode;
use std::path::Path;

/// File, then `CONSENTUI_*` environment, then the `--region` flag.
pub fn resolve_config(path: Option<&Path>, region: Option<&str>) -> Result<ConsentConfig> {
    resolve_config_with(path, region, |key| std::env::var(key).ok())
}

pub fn resolve_config_with<F>(
    path: Option<&Path>,
    region: Option<&str>,
    lookup: F,
) -> Result<ConsentConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let config = match path {
        Some(path) => ConsentConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ConsentConfig::default(),
    };
    let mut config = config
        .apply_env_with(lookup)
        .context("Invalid CONSENTUI_* environment override")?;
    if let Some(raw) = region {
        let code =
            RegionCode::parse(raw).with_context(|| format!("Invalid region code: {raw}"))?;
        config.region = Some(code);
    }
    Ok(config)
}
