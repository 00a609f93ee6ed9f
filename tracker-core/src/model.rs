use serde::{Deserialize, Serialize};

/// Live-conditions data attached to a [`Candidate`] after its follow-up
/// forecast call. `Pending` covers both "call still outstanding" and
/// "call failed"; the row stays displayable either way.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Enrichment {
    #[default]
    Pending,
    Ready { temp_c: f64, icon: String },
}

impl Enrichment {
    pub fn temp_c(&self) -> Option<f64> {
        match self {
            Enrichment::Pending => None,
            Enrichment::Ready { temp_c, .. } => Some(*temp_c),
        }
    }

    pub fn icon(&self) -> Option<&str> {
        match self {
            Enrichment::Pending => None,
            Enrichment::Ready { icon, .. } => Some(icon.as_str()),
        }
    }
}

/// One row of a city search result.
///
/// Identity fields (`id`, `name`, `country`, coordinates, `url`) come from
/// the lookup call and never change afterwards; only `enrichment` is filled
/// in later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    /// Opaque provider-specific locator, carried through as-is.
    pub url: String,
    #[serde(default)]
    pub enrichment: Enrichment,
}

impl Candidate {
    /// `"lat,lon"` string accepted by the provider's detail endpoint.
    pub fn coordinates(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}

/// Full current-conditions view for one selected city. A value, not an
/// entity: always derived fresh from a candidate or a provider response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    pub name: String,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub uv: f64,
    pub condition: String,
    pub icon: String,
}

impl Detail {
    /// Lightweight detail synthesized from an already-listed candidate.
    ///
    /// Selecting from the list is instant and costs no network call, at the
    /// price of a less complete view: condition text, icon, humidity and UV
    /// are not part of the synthesis and are filled with neutral values.
    pub fn from_candidate(candidate: &Candidate) -> Self {
        let temp_c = candidate.enrichment.temp_c().unwrap_or(0.0);
        Detail {
            name: candidate.name.clone(),
            temp_c,
            feels_like_c: temp_c,
            humidity_pct: 0,
            uv: 0.0,
            condition: "Unknown".to_string(),
            icon: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(enrichment: Enrichment) -> Candidate {
        Candidate {
            id: 2801268,
            name: "London".to_string(),
            country: "United Kingdom".to_string(),
            lat: 51.52,
            lon: -0.11,
            url: "london-city-of-london-greater-london-united-kingdom".to_string(),
            enrichment,
        }
    }

    #[test]
    fn coordinates_uses_lat_comma_lon() {
        let c = candidate(Enrichment::Pending);
        assert_eq!(c.coordinates(), "51.52,-0.11");
    }

    #[test]
    fn detail_from_enriched_candidate_carries_temp_and_neutral_rest() {
        let c = candidate(Enrichment::Ready {
            temp_c: 11.0,
            icon: "https://cdn.weatherapi.com/weather/64x64/day/116.png".to_string(),
        });

        let detail = Detail::from_candidate(&c);
        assert_eq!(detail.name, "London");
        assert_eq!(detail.temp_c, 11.0);
        assert_eq!(detail.feels_like_c, 11.0);
        assert_eq!(detail.condition, "Unknown");
        assert_eq!(detail.humidity_pct, 0);
        assert_eq!(detail.uv, 0.0);
        // The synthesis never carries an icon, even when enrichment has one.
        assert!(detail.icon.is_empty());
    }

    #[test]
    fn detail_from_pending_candidate_falls_back_to_zero() {
        let detail = Detail::from_candidate(&candidate(Enrichment::Pending));
        assert_eq!(detail.temp_c, 0.0);
        assert_eq!(detail.feels_like_c, 0.0);
        assert!(detail.icon.is_empty());
    }

    #[test]
    fn enrichment_accessors_expose_ready_values() {
        let ready = Enrichment::Ready { temp_c: 7.5, icon: "https://x/y.png".to_string() };
        assert_eq!(ready.temp_c(), Some(7.5));
        assert_eq!(ready.icon(), Some("https://x/y.png"));
        assert_eq!(Enrichment::Pending.temp_c(), None);
        assert_eq!(Enrichment::Pending.icon(), None);
    }
}
