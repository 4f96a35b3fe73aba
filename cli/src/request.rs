//! The `request` command

use crate::settings::resolve_config;
use crate::terminal::TerminalPresenter;
use anyhow::{Context, Result};
use consentui_core::config::ConsentConfig;
use consentui_core::presenter::HostId;
use consentui_runtime::{ConsentFlowController, Unsupported};
use std::path::PathBuf;
use std::sync::Arc;

pub struct RequestOptions {
    pub if_needed: bool,
    pub region: Option<String>,
    pub config: Option<PathBuf>,
    pub host: String,
    pub json: bool,
}

/// Controller with the terminal dialog and a deferred `Unsupported` authorizer.
pub fn controller(config: ConsentConfig) -> ConsentFlowController {
    ConsentFlowController::from_config(&config, Arc::new(TerminalPresenter), Unsupported)
}

pub async fn run_request_command(options: RequestOptions) -> Result<()> {
    let config = resolve_config(options.config.as_deref(), options.region.as_deref())?;
    let controller = controller(config);
    let host = HostId::new(options.host.as_str());

    let outcome = if options.if_needed {
        controller.request_consent_if_needed(&host).await
    } else {
        controller.request_consent(&host).await
    };

    if options.json {
        let json =
            serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?;
        println!("{json}");
    } else {
        println!("{outcome}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use consentui_core::region::RegionCode;

    #[test]
    fn test_non_eea_controller_skips_dialog() {
        let mut config = ConsentConfig::default();
        config.region = Some(RegionCode::parse("US").unwrap());
        let controller = controller(config);
        assert!(!controller.is_consent_required());
    }
}
