//! Ordering configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `LEIPOMO_API_BASE_URL` - Base URL of the ordering API (default: `http://127.0.0.1:8000/api/v2/`)
//! - `LEIPOMO_SESSION_DIR` - Directory for the persisted order session (default: `.leipomo`)
//! - `LEIPOMO_LANG` - Widget language: `fi`, `sv` or `en` (default: `fi`)
//! - `LEIPOMO_OFFLINE_CHECKOUT` - `permissive` or `block` when order constraints
//!   cannot be fetched (default: `permissive`)
//! - `LEIPOMO_DEFAULT_MIN_LEAD_MINUTES` - Fallback minimum lead time (default: 720)
//! - `LEIPOMO_DEFAULT_MAX_DAYS` - Fallback booking horizon in days (default: 60)
//! - `LEIPOMO_FEATURED_CATEGORIES` - Comma-separated category name fragments to
//!   feature (default: `uunituoreet,pakaste`)

use std::path::PathBuf;
use std::str::FromStr;

use leipomo_core::Language;
use thiserror::Error;
use url::Url;

use crate::schedule::OrderConstraints;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api/v2/";
const DEFAULT_SESSION_DIR: &str = ".leipomo";
const DEFAULT_FEATURED_CATEGORIES: &str = "uunituoreet,pakaste";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// What the date step does when order constraints could not be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OfflinePolicy {
    /// Continue with the configured fallback constraints.
    #[default]
    Permissive,
    /// Refuse to offer pickup dates until constraints are available.
    Block,
}

impl FromStr for OfflinePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "block" => Ok(Self::Block),
            other => Err(format!("expected 'permissive' or 'block', got '{other}'")),
        }
    }
}

/// Ordering engine configuration.
#[derive(Debug, Clone)]
pub struct OrderingConfig {
    /// Base URL every API endpoint is resolved against (always ends in `/`)
    pub api_base_url: Url,
    /// Directory holding the persisted order session
    pub session_dir: PathBuf,
    /// Widget language
    pub language: Language,
    /// Behaviour when constraints are unavailable
    pub offline_policy: OfflinePolicy,
    /// Constraints used when the constraints endpoint fails
    pub fallback_constraints: OrderConstraints,
    /// Lowercased category name fragments shown first in the catalog
    pub featured_categories: Vec<String>,
}

impl OrderingConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_base_url = parse_base_url(
            "LEIPOMO_API_BASE_URL",
            &env_or("LEIPOMO_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let session_dir = PathBuf::from(env_or("LEIPOMO_SESSION_DIR", DEFAULT_SESSION_DIR));
        let language = parse_var::<Language>("LEIPOMO_LANG", &env_or("LEIPOMO_LANG", "fi"))?;
        let offline_policy = parse_var::<OfflinePolicy>(
            "LEIPOMO_OFFLINE_CHECKOUT",
            &env_or("LEIPOMO_OFFLINE_CHECKOUT", "permissive"),
        )?;

        let fallback = OrderConstraints::fallback();
        let min_lead_minutes = parse_var::<u32>(
            "LEIPOMO_DEFAULT_MIN_LEAD_MINUTES",
            &env_or(
                "LEIPOMO_DEFAULT_MIN_LEAD_MINUTES",
                &fallback.min_lead_minutes.to_string(),
            ),
        )?;
        let max_days = parse_var::<u32>(
            "LEIPOMO_DEFAULT_MAX_DAYS",
            &env_or("LEIPOMO_DEFAULT_MAX_DAYS", &fallback.max_days.to_string()),
        )?;

        let featured_categories = parse_list(&env_or(
            "LEIPOMO_FEATURED_CATEGORIES",
            DEFAULT_FEATURED_CATEGORIES,
        ));

        Ok(Self {
            api_base_url,
            session_dir,
            language,
            offline_policy,
            fallback_constraints: OrderConstraints {
                min_lead_minutes,
                max_days,
                blackout_dates: Vec::new(),
            },
            featured_categories,
        })
    }

    /// The subset of configuration the order flow needs.
    #[must_use]
    pub fn flow_settings(&self) -> FlowSettings {
        FlowSettings {
            language: self.language,
            offline_policy: self.offline_policy,
            fallback_constraints: self.fallback_constraints.clone(),
            featured_categories: self.featured_categories.clone(),
        }
    }
}

/// Settings consumed by [`OrderFlow`](crate::flow::OrderFlow).
#[derive(Debug, Clone)]
pub struct FlowSettings {
    /// Widget language
    pub language: Language,
    /// Behaviour when constraints are unavailable
    pub offline_policy: OfflinePolicy,
    /// Constraints used when the constraints endpoint fails
    pub fallback_constraints: OrderConstraints,
    /// Lowercased category name fragments shown first in the catalog
    pub featured_categories: Vec<String>,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            offline_policy: OfflinePolicy::default(),
            fallback_constraints: OrderConstraints::fallback(),
            featured_categories: parse_list(DEFAULT_FEATURED_CATEGORIES),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable with `FromStr`, mapping failures to `InvalidEnvVar`.
fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse the API base URL. A trailing slash is added so relative endpoint
/// paths join under it instead of replacing the last segment.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an http(s) URL".to_string(),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Split a comma-separated list into trimmed, lowercased, non-empty entries.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<OrderingConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        OrderingConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_base_url.as_str(), DEFAULT_API_BASE_URL);
        assert_eq!(config.language, Language::Fi);
        assert_eq!(config.offline_policy, OfflinePolicy::Permissive);
        assert_eq!(config.fallback_constraints.min_lead_minutes, 720);
        assert_eq!(config.fallback_constraints.max_days, 60);
        assert_eq!(config.featured_categories, vec!["uunituoreet", "pakaste"]);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = config_from(&[("LEIPOMO_API_BASE_URL", "https://leipomo.example/api/v2")])
            .unwrap();
        assert_eq!(
            config.api_base_url.join("order").unwrap().as_str(),
            "https://leipomo.example/api/v2/order"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = config_from(&[("LEIPOMO_API_BASE_URL", "mailto:orders@leipomo.example")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "LEIPOMO_API_BASE_URL"));
    }

    #[test]
    fn test_invalid_language() {
        let err = config_from(&[("LEIPOMO_LANG", "de")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "LEIPOMO_LANG"));
    }

    #[test]
    fn test_offline_policy_block() {
        let config = config_from(&[("LEIPOMO_OFFLINE_CHECKOUT", "BLOCK")]).unwrap();
        assert_eq!(config.offline_policy, OfflinePolicy::Block);
    }

    #[test]
    fn test_fallback_overrides() {
        let config = config_from(&[
            ("LEIPOMO_DEFAULT_MIN_LEAD_MINUTES", "60"),
            ("LEIPOMO_DEFAULT_MAX_DAYS", "14"),
        ])
        .unwrap();
        assert_eq!(config.fallback_constraints.min_lead_minutes, 60);
        assert_eq!(config.fallback_constraints.max_days, 14);

        assert!(config_from(&[("LEIPOMO_DEFAULT_MAX_DAYS", "-1")]).is_err());
    }

    #[test]
    fn test_flow_settings_match_defaults() {
        let settings = config_from(&[]).unwrap().flow_settings();
        let defaults = FlowSettings::default();
        assert_eq!(settings.language, defaults.language);
        assert_eq!(settings.fallback_constraints, defaults.fallback_constraints);
        assert_eq!(settings.featured_categories, defaults.featured_categories);
    }

    #[test]
    fn test_featured_categories_list() {
        let config = config_from(&[("LEIPOMO_FEATURED_CATEGORIES", " Pullat , ,PIIRAKAT")])
            .unwrap();
        assert_eq!(config.featured_categories, vec!["pullat", "piirakat"]);
    }
}
