use crate::{
    Config,
    model::{Candidate, Detail},
    provider::weatherapi::WeatherApiProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod weatherapi;

/// The one failure kind a provider exposes. Transport errors, non-2xx
/// statuses, parse failures and not-found all collapse into it; the source
/// is kept for logging only, never for dispatch.
#[derive(Debug, thiserror::Error)]
#[error("weather provider unavailable: {0}")]
pub struct ProviderError(pub anyhow::Error);

impl ProviderError {
    pub fn new(err: impl Into<anyhow::Error>) -> Self {
        ProviderError(err.into())
    }
}

/// A forecast backend: city search plus current conditions for one place.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Returns candidate locations matching a free-text query. An empty
    /// list is a valid success, not an error.
    async fn lookup(&self, query: &str) -> Result<Vec<Candidate>, ProviderError>;

    /// Returns current conditions for `locator`, which is either a city
    /// name or a `"lat,lon"` pair.
    async fn detail(&self, locator: &str) -> Result<Detail, ProviderError>;
}

/// Construct the WeatherAPI.com provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<WeatherApiProvider> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
             Hint: run `tracker configure` and enter your WeatherAPI.com key."
        )
    })?;

    Ok(WeatherApiProvider::new(api_key.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn provider_from_config_works_when_key_set() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());
        assert!(provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn provider_error_collapses_to_one_kind() {
        let err = ProviderError::new(anyhow::anyhow!("connection reset"));
        let msg = err.to_string();
        assert!(msg.starts_with("weather provider unavailable"));
        assert!(msg.contains("connection reset"));
    }
}
