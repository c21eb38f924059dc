use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct GeoResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub admin1: Option<String>,
    pub country: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct GeoSearch {
    pub results: Option<Vec<GeoResult>>,
}
