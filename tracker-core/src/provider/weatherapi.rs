use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::model::{Candidate, Detail, Enrichment};

use super::{ForecastProvider, ProviderError};

const BASE_URL: &str = "https://api.weatherapi.com/v1";

/// WeatherAPI.com backend: `search.json` for city lookup, `current.json`
/// for conditions.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    http: Client,
    base_url: String,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self { api_key, http: Client::new(), base_url: BASE_URL.to_string() }
    }

    async fn get(&self, endpoint: &str, query: &str) -> Result<String> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", query)])
            .send()
            .await
            .with_context(|| format!("Failed to send request to WeatherAPI.com ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read WeatherAPI {endpoint} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "WeatherAPI {} request failed with status {}: {}",
                endpoint,
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct WaSearchItem {
    id: i64,
    name: String,
    country: String,
    lat: f64,
    lon: f64,
    url: String,
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: u8,
    uv: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaCurrentResponse {
    location: WaLocation,
    current: WaCurrent,
}

fn parse_candidates(body: &str) -> Result<Vec<Candidate>> {
    let items: Vec<WaSearchItem> =
        serde_json::from_str(body).context("Failed to parse WeatherAPI search JSON")?;

    Ok(items
        .into_iter()
        .map(|item| Candidate {
            id: item.id,
            name: item.name,
            country: item.country,
            lat: item.lat,
            lon: item.lon,
            url: item.url,
            enrichment: Enrichment::Pending,
        })
        .collect())
}

fn parse_detail(body: &str) -> Result<Detail> {
    let parsed: WaCurrentResponse =
        serde_json::from_str(body).context("Failed to parse WeatherAPI current JSON")?;

    Ok(Detail {
        name: parsed.location.name,
        temp_c: parsed.current.temp_c,
        feels_like_c: parsed.current.feelslike_c,
        humidity_pct: parsed.current.humidity,
        uv: parsed.current.uv,
        condition: parsed.current.condition.text,
        icon: absolute_icon_url(&parsed.current.condition.icon),
    })
}

/// WeatherAPI returns protocol-relative icon URLs (`//cdn.weatherapi.com/...`).
fn absolute_icon_url(icon: &str) -> String {
    if icon.starts_with("//") { format!("https:{icon}") } else { icon.to_string() }
}

#[async_trait]
impl ForecastProvider for WeatherApiProvider {
    async fn lookup(&self, query: &str) -> Result<Vec<Candidate>, ProviderError> {
        let body = self.get("search.json", query).await.map_err(ProviderError::new)?;
        parse_candidates(&body).map_err(ProviderError::new)
    }

    async fn detail(&self, locator: &str) -> Result<Detail, ProviderError> {
        let body = self.get("current.json", locator).await.map_err(ProviderError::new)?;
        parse_detail(&body).map_err(ProviderError::new)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    // Cut at a char boundary; error pages are not guaranteed to be ASCII.
    match body.char_indices().nth(MAX) {
        Some((i, _)) => format!("{}...", &body[..i]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_BODY: &str = r#"[
        {"id": 2801268, "name": "London", "region": "City of London, Greater London",
         "country": "United Kingdom", "lat": 51.52, "lon": -0.11,
         "url": "london-city-of-london-greater-london-united-kingdom"},
        {"id": 315398, "name": "London", "region": "Ontario",
         "country": "Canada", "lat": 42.98, "lon": -81.25,
         "url": "london-ontario-canada"}
    ]"#;

    const CURRENT_BODY: &str = r#"{
        "location": {"name": "Paris", "country": "France"},
        "current": {
            "temp_c": 18.0,
            "feelslike_c": 17.2,
            "humidity": 63,
            "uv": 4.0,
            "condition": {"text": "Partly cloudy", "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png"}
        }
    }"#;

    #[test]
    fn parse_candidates_preserves_order_and_identity() {
        let candidates = parse_candidates(SEARCH_BODY).expect("valid search body");
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, 2801268);
        assert_eq!(candidates[0].country, "United Kingdom");
        assert_eq!(candidates[1].country, "Canada");
        assert_eq!(candidates[0].enrichment, Enrichment::Pending);
    }

    #[test]
    fn parse_candidates_accepts_empty_result() {
        let candidates = parse_candidates("[]").expect("empty result is a valid success");
        assert!(candidates.is_empty());
    }

    #[test]
    fn parse_detail_maps_all_fields() {
        let detail = parse_detail(CURRENT_BODY).expect("valid current body");
        assert_eq!(detail.name, "Paris");
        assert_eq!(detail.temp_c, 18.0);
        assert_eq!(detail.feels_like_c, 17.2);
        assert_eq!(detail.humidity_pct, 63);
        assert_eq!(detail.uv, 4.0);
        assert_eq!(detail.condition, "Partly cloudy");
        assert_eq!(detail.icon, "https://cdn.weatherapi.com/weather/64x64/day/116.png");
    }

    #[test]
    fn parse_detail_rejects_garbage() {
        assert!(parse_detail("not json").is_err());
    }

    #[test]
    fn icon_url_left_alone_when_already_absolute() {
        assert_eq!(absolute_icon_url("https://x/y.png"), "https://x/y.png");
    }

    #[test]
    fn truncate_body_keeps_short_bodies_intact() {
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn truncate_body_handles_multibyte_text_near_the_cutoff() {
        // Byte 200 lands inside a multi-byte character; a naive byte slice
        // would panic here.
        let body = format!("{}°°°", "x".repeat(199));
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.starts_with("xxx"));

        let all_multibyte = "é".repeat(300);
        assert!(truncate_body(&all_multibyte).ends_with("..."));
    }
}
