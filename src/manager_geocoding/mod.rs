use std::fmt;
use std::time::Duration;
use log::info;
use ureq::Agent;
use crate::errors::GeoError;
use crate::models::geocoding::{GeoResult, GeoSearch};

/// A resolved location
#[derive(Clone, Debug, PartialEq)]
pub struct Place {
    pub lat: f64,
    pub long: f64,
    pub label: String,
    pub timezone: Option<String>,
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({:.4}, {:.4})", self.label, self.lat, self.long)
    }
}

/// Struct for resolving place names to coordinates using the Open-Meteo geocoding API
pub struct GeoCoding {
    agent: Agent,
}

impl GeoCoding {
    /// Returns a GeoCoding struct ready for resolving place names
    pub fn new() -> GeoCoding {
        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .build();

        let agent = config.into();

        Self { agent }
    }

    /// Resolves a place name into a Place with coordinates, label and time zone.
    ///
    /// A query given as a coordinate pair, e.g. "51.5074, -0.1278", is used as is without
    /// asking the geocoding service.
    ///
    /// # Arguments
    ///
    /// * 'query' - place name or coordinate pair
    pub fn geocode(&self, query: &str) -> Result<Place, GeoError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeoError::EmptyQuery);
        }

        if let Some(place) = parse_coordinates(query) {
            return Ok(place);
        }

        let json = self.agent
            .get("https://geocoding-api.open-meteo.com/v1/search")
            .query("name", query)
            .query("count", "1")
            .query("language", "en")
            .query("format", "json")
            .call()?
            .body_mut()
            .read_to_string()?;

        let place = to_place(serde_json::from_str(&json)?)
            .ok_or_else(|| GeoError::NotFound(query.to_string()))?;

        info!("geocoding OK: {}", place);

        Ok(place)
    }
}

/// Picks the first search result and turns it into a Place
///
/// # Arguments
///
/// * 'search' - search response from the geocoding service
fn to_place(search: GeoSearch) -> Option<Place> {
    let result: GeoResult = search.results?.into_iter().next()?;

    let mut label = result.name;
    for part in [result.admin1, result.country].into_iter().flatten() {
        if !part.is_empty() {
            label.push_str(", ");
            label.push_str(&part);
        }
    }

    Some(Place {
        lat: result.latitude,
        long: result.longitude,
        label,
        timezone: result.timezone,
    })
}

/// Parses a "lat, long" pair into a Place, None if the query isn't a valid coordinate
///
/// # Arguments
///
/// * 'query' - the text to parse
fn parse_coordinates(query: &str) -> Option<Place> {
    let (lat, long) = query.split_once(',')?;
    let lat = lat.trim().parse::<f64>().ok()?;
    let long = long.trim().parse::<f64>().ok()?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&long) {
        return None;
    }

    Some(Place {
        lat,
        long,
        label: format!("{:.4}, {:.4}", lat, long),
        timezone: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_name_admin_and_country() {
        let json = r#"{"results": [{
            "name": "London", "latitude": 51.50853, "longitude": -0.12574,
            "admin1": "England", "country": "United Kingdom", "timezone": "Europe/London"
        }]}"#;
        let place = to_place(serde_json::from_str(json).unwrap()).unwrap();

        assert_eq!(place.label, "London, England, United Kingdom");
        assert_eq!(place.timezone.as_deref(), Some("Europe/London"));
        assert_eq!(place.lat, 51.50853);
    }

    #[test]
    fn test_label_without_admin() {
        let json = r#"{"results": [{"name": "Monaco", "latitude": 43.7, "longitude": 7.4, "country": "Monaco"}]}"#;
        let place = to_place(serde_json::from_str(json).unwrap()).unwrap();

        assert_eq!(place.label, "Monaco, Monaco");
        assert!(place.timezone.is_none());
    }

    #[test]
    fn test_no_results_is_none() {
        assert!(to_place(serde_json::from_str(r#"{}"#).unwrap()).is_none());
        assert!(to_place(serde_json::from_str(r#"{"results": []}"#).unwrap()).is_none());
    }

    #[test]
    fn test_coordinates_bypass_search() {
        let geo = GeoCoding::new();
        let place = geo.geocode(" 51.5074, -0.1278 ").unwrap();

        assert_eq!(place.label, "51.5074, -0.1278");
        assert_eq!(place.long, -0.1278);
        assert!(place.timezone.is_none());
    }

    #[test]
    fn test_invalid_coordinates_are_not_parsed() {
        assert!(parse_coordinates("95.0, 10.0").is_none());
        assert!(parse_coordinates("Paris, France").is_none());
        assert!(parse_coordinates("51.5").is_none());
    }

    #[test]
    fn test_empty_query() {
        let geo = GeoCoding::new();
        assert!(matches!(geo.geocode("   "), Err(GeoError::EmptyQuery)));
    }
}
