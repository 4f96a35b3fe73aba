//! # Region: EEA membership
//!
//! Decides whether the caller sits in a region where explicit consent is
//! legally required. The region code itself comes from a [`RegionSource`],
//! the platform locale collaborator.
//!
//! An unknown region is always treated as "consent required".

use crate::error::RegionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Regions in which consent is required: 27 EU members, 3 EFTA states, and the UK.
pub const EEA_REGIONS: [&str; 31] = [
    // EU
    "AT", "BE", "BG", "HR", "CY", "CZ", "DK", "EE", "FI", "FR", "DE", "GR", "HU", "IE", "IT",
    "LV", "LT", "LU", "MT", "NL", "PL", "PT", "RO", "SK", "SI", "ES", "SE",
    // EFTA
    "IS", "LI", "NO",
    // UK
    "GB",
];

/// Case-insensitive membership check against [`EEA_REGIONS`].
pub fn is_eea_region(code: &str) -> bool {
    let code = code.trim();
    EEA_REGIONS
        .iter()
        .any(|member| member.eq_ignore_ascii_case(code))
}

/// A two-letter region identifier (ISO 3166-1 alpha-2 shape), stored upper-case.
///
/// Only the shape is validated; the code is not checked against the ISO list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionCode([u8; 2]);

impl RegionCode {
    pub fn parse(raw: &str) -> Result<Self, RegionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RegionError::Empty);
        }
        let length = trimmed.chars().count();
        if length != 2 {
            return Err(RegionError::InvalidLength(length));
        }
        let bytes = trimmed.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(RegionError::NonAlphabetic(trimmed.to_string()));
        }
        Ok(Self([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
        ]))
    }

    pub fn as_str(&self) -> &str {
        // Both bytes are ASCII letters by construction.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }

    pub fn is_eea(&self) -> bool {
        is_eea_region(self.as_str())
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionCode {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RegionCode {
    type Error = RegionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RegionCode> for String {
    fn from(code: RegionCode) -> Self {
        code.as_str().to_string()
    }
}

/// The platform locale collaborator.
///
/// Returns the raw region code of the current locale, or `None` when the
/// platform cannot tell.
pub trait RegionSource: Send + Sync {
    fn current_region(&self) -> Option<String>;
}

impl<F> RegionSource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn current_region(&self) -> Option<String> {
        self()
    }
}

/// A region source pinned to one value. `FixedRegion(None)` simulates an
/// unresolvable locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedRegion(pub Option<String>);

impl FixedRegion {
    pub fn new(code: impl Into<String>) -> Self {
        Self(Some(code.into()))
    }

    pub fn unknown() -> Self {
        Self(None)
    }
}

impl RegionSource for FixedRegion {
    fn current_region(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Reads the region from the POSIX locale variables.
///
/// Precedence is `LC_ALL`, `LC_MESSAGES`, then `LANG`; the first non-empty
/// variable wins even if it carries no territory.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixLocaleSource;

impl PosixLocaleSource {
    const VARIABLES: [&'static str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

    /// Resolve using an arbitrary variable lookup.
    pub fn resolve_with<F>(lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::VARIABLES
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
            .and_then(|locale| territory_of(&locale))
    }
}

impl RegionSource for PosixLocaleSource {
    fn current_region(&self) -> Option<String> {
        Self::resolve_with(|name| std::env::var(name).ok())
    }
}

/// Extracts the territory from a locale name shaped `language[_territory][.codeset][@modifier]`.
///
/// `de_DE.UTF-8` yields `DE`; `C`, `POSIX`, and `en` yield nothing. BCP 47
/// style tags (`pt-BR`, `zh-Hant-TW`) are accepted as well.
pub fn territory_of(locale: &str) -> Option<String> {
    let locale = locale.trim();
    let base = locale
        .split(['.', '@'])
        .next()
        .unwrap_or_default();
    if base.eq_ignore_ascii_case("C") || base.eq_ignore_ascii_case("POSIX") {
        return None;
    }
    base.split(['_', '-'])
        .skip(1)
        .map(str::trim)
        .find(|segment| is_territory_subtag(segment))
        .map(str::to_string)
}

/// Two letters (`TW`) or a UN M.49 area code (`419`); script subtags such as
/// `Hant` and variants such as `POSIX` are skipped.
fn is_territory_subtag(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    match bytes.len() {
        2 => bytes.iter().all(u8::is_ascii_alphabetic),
        3 => bytes.iter().all(u8::is_ascii_digit),
        _ => false,
    }
}

/// Decides EEA membership for the current region.
///
/// Nothing is cached: locales can change between calls.
#[derive(Clone)]
pub struct RegionResolver {
    source: Arc<dyn RegionSource>,
}

impl RegionResolver {
    pub fn new(source: impl RegionSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn from_arc(source: Arc<dyn RegionSource>) -> Self {
        Self { source }
    }

    /// The current region, if the platform reports a well-formed one.
    pub fn current_region(&self) -> Option<RegionCode> {
        let raw = self.source.current_region()?;
        match RegionCode::parse(&raw) {
            Ok(code) => Some(code),
            Err(error) => {
                tracing::debug!(%error, raw = %raw, "Unusable region code from platform");
                None
            }
        }
    }

    /// `true` when the region is in the EEA set or cannot be determined.
    pub fn is_consent_required(&self) -> bool {
        match self.current_region() {
            Some(code) => code.is_eea(),
            None => true,
        }
    }
}

impl fmt::Debug for RegionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    #[test]
    fn test_eea_set_has_31_distinct_members() {
        let unique: HashSet<_> = EEA_REGIONS.iter().collect();
        assert_eq!(EEA_REGIONS.len(), 31);
        assert_eq!(unique.len(), 31);
    }

    #[test]
    fn test_every_member_requires_consent_in_any_case() {
        for code in EEA_REGIONS {
            let lower = code.to_ascii_lowercase();
            assert!(RegionResolver::new(FixedRegion::new(code)).is_consent_required());
            assert!(RegionResolver::new(FixedRegion::new(lower.clone())).is_consent_required());
            assert!(is_eea_region(&lower), "{lower} should be EEA");
        }
    }

    #[test]
    fn test_non_eea_regions_do_not_require_consent() {
        for code in ["US", "CA", "JP", "CN", "KR", "AU", "ch", "br"] {
            let resolver = RegionResolver::new(FixedRegion::new(code));
            assert!(!resolver.is_consent_required(), "{code} should not require consent");
        }
    }

    #[test]
    fn test_unknown_region_is_fail_safe() {
        assert!(RegionResolver::new(FixedRegion::unknown()).is_consent_required());
        assert!(RegionResolver::new(FixedRegion::new("")).is_consent_required());
        assert!(RegionResolver::new(FixedRegion::new("USA")).is_consent_required());
        assert!(RegionResolver::new(FixedRegion::new("4x")).is_consent_required());
    }

    #[test]
    fn test_region_code_parse() {
        assert_eq!(RegionCode::parse(" de ").unwrap().as_str(), "DE");
        assert!(matches!(RegionCode::parse(""), Err(RegionError::Empty)));
        assert!(matches!(
            RegionCode::parse("DEU"),
            Err(RegionError::InvalidLength(3))
        ));
        assert!(matches!(
            RegionCode::parse("D1"),
            Err(RegionError::NonAlphabetic(_))
        ));
        assert!(matches!(
            RegionCode::parse("ü"),
            Err(RegionError::InvalidLength(1))
        ));
    }

    #[test]
    fn test_region_code_serde_as_string() {
        let code: RegionCode = serde_json::from_str("\"fr\"").unwrap();
        assert_eq!(code.to_string(), "FR");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"FR\"");
        assert!(serde_json::from_str::<RegionCode>("\"France\"").is_err());
    }

    #[test]
    fn test_resolver_is_not_cached() {
        let current = Arc::new(Mutex::new(Some("US".to_string())));
        let handle = current.clone();
        let resolver = RegionResolver::new(move || handle.lock().unwrap().clone());

        assert!(!resolver.is_consent_required());
        *current.lock().unwrap() = Some("NL".to_string());
        assert!(resolver.is_consent_required());
    }

    #[test]
    fn test_territory_of_locale_names() {
        assert_eq!(territory_of("de_DE.UTF-8").as_deref(), Some("DE"));
        assert_eq!(territory_of("sr_RS@latin").as_deref(), Some("RS"));
        assert_eq!(territory_of("pt-BR").as_deref(), Some("BR"));
        assert_eq!(territory_of("en"), None);
        assert_eq!(territory_of("C.UTF-8"), None);
        assert_eq!(territory_of("POSIX"), None);
        assert_eq!(territory_of("en_"), None);
    }

    #[test]
    fn test_territory_skips_script_and_variant_subtags() {
        assert_eq!(territory_of("zh-Hant-TW").as_deref(), Some("TW"));
        assert_eq!(territory_of("zh_Hans_CN.UTF-8").as_deref(), Some("CN"));
        assert_eq!(territory_of("sr-Latn-RS").as_deref(), Some("RS"));
        assert_eq!(territory_of("en_US_POSIX").as_deref(), Some("US"));
        assert_eq!(territory_of("es-419").as_deref(), Some("419"));
        assert_eq!(territory_of("zh-Hant"), None);

        let taiwan = RegionResolver::new(|| territory_of("zh-Hant-TW"));
        assert!(!taiwan.is_consent_required());
        let us = RegionResolver::new(|| territory_of("en_US_POSIX"));
        assert!(!us.is_consent_required());
        let serbia_latin = RegionResolver::new(|| territory_of("sr-Latn-RS"));
        assert!(!serbia_latin.is_consent_required());
        // Area codes are not country codes and stay on the fail-safe path.
        let latin_america = RegionResolver::new(|| territory_of("es-419"));
        assert!(latin_america.is_consent_required());
    }

    #[test]
    fn test_posix_precedence() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LC_ALL", ""),
            ("LC_MESSAGES", "fr_FR.UTF-8"),
            ("LANG", "en_US.UTF-8"),
        ]);
        let region =
            PosixLocaleSource::resolve_with(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(region.as_deref(), Some("FR"));

        let only_lang = PosixLocaleSource::resolve_with(|name| {
            (name == "LANG").then(|| "ja_JP.eucJP".to_string())
        });
        assert_eq!(only_lang.as_deref(), Some("JP"));

        assert_eq!(PosixLocaleSource::resolve_with(|_| None), None);
    }
}
