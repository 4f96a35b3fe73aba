//! Region inspection commands

use crate::settings::resolve_config;
use anyhow::Result;
use consentui_core::region::{EEA_REGIONS, RegionResolver};
use std::path::Path;

/// Print the region the SDK would resolve and whether it gates the dialog
pub fn run_region_command(config: Option<&Path>, region: Option<&str>) -> Result<()> {
    let config = resolve_config(config, region)?;
    let resolver = RegionResolver::from_arc(config.region_source());
    print!("{}", describe(&resolver));
    Ok(())
}

pub fn describe(resolver: &RegionResolver) -> String {
    let region = match resolver.current_region() {
        Some(code) => {
            let area = if code.is_eea() { "EEA" } else { "outside EEA" };
            format!("region: {code} ({area})")
        }
        None => "region: unknown (treated as EEA)".to_string(),
    };
    let required = if resolver.is_consent_required() { "yes" } else { "no" };
    format!("{region}\nconsent required: {required}\n")
}

pub fn run_eea_command() {
    for line in EEA_REGIONS.chunks(8) {
        println!("{}", line.join(" "));
    }
}
