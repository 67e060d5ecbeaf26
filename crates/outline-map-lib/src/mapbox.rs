//! HTTP gateway for Mapbox-compatible geocoding and directions APIs
//!
//! Both services answer with `[lon, lat]` pairs; everything leaving this module is
//! converted to [`Coordinates`] (latitude first).

use crate::{Coordinates, DirectionsGateway, GeocodingGateway, MapError, Result};
use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Characters left as-is in a path segment or query value (RFC 3986 unreserved)
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Service endpoints and credentials, injected by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Scheme and host of the API, e.g. `https://api.mapbox.com`
    pub api_base_url: String,
    pub access_token: String,
    /// Geocoding endpoint identifier (`mapbox.places`)
    pub geocoding_provider: String,
    /// Directions profile namespace (`mapbox`)
    pub directions_provider: String,
    /// Maximum geocoding requests in flight, 1 resolves one node at a time
    pub lookup_concurrency: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.mapbox.com".to_string(),
            access_token: String::new(),
            geocoding_provider: "mapbox.places".to_string(),
            directions_provider: "mapbox".to_string(),
            lookup_concurrency: 1,
        }
    }
}

/// Geocoding and directions client over `reqwest`
#[derive(Debug, Clone)]
pub struct MapboxClient {
    http: reqwest::Client,
    config: ServiceConfig,
}

impl MapboxClient {
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    pub fn with_http_client(config: ServiceConfig, http: reqwest::Client) -> Self {
        if config.access_token.is_empty() {
            tracing::warn!("No access token configured for {}", config.api_base_url);
        }
        Self { http, config }
    }

    fn base_url(&self) -> &str {
        self.config.api_base_url.trim_end_matches('/')
    }

    fn token(&self) -> String {
        utf8_percent_encode(&self.config.access_token, COMPONENT).to_string()
    }

    /// `GET /geocoding/v5/{provider}/{name}.json?access_token=...`
    pub fn geocoding_url(&self, query: &str) -> String {
        format!(
            "{}/geocoding/v5/{}/{}.json?access_token={}",
            self.base_url(),
            self.config.geocoding_provider,
            utf8_percent_encode(query, COMPONENT),
            self.token()
        )
    }

    /// `GET /directions/v5/{provider}/driving/{lon},{lat};...?geometries=geojson&access_token=...`
    pub fn directions_url(&self, waypoints: &[Coordinates]) -> String {
        let path = waypoints
            .iter()
            .map(|c| format!("{},{}", c.lon, c.lat))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/directions/v5/{}/driving/{}?geometries=geojson&access_token={}",
            self.base_url(),
            self.config.directions_provider,
            path,
            self.token()
        )
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MapError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl GeocodingGateway for MapboxClient {
    async fn forward(&self, query: &str) -> Result<Vec<Coordinates>> {
        let body = self.get_text(&self.geocoding_url(query)).await?;
        decode_geocoding(&body)
    }
}

#[async_trait]
impl DirectionsGateway for MapboxClient {
    async fn driving_route(&self, waypoints: &[Coordinates]) -> Result<Vec<Coordinates>> {
        let body = self.get_text(&self.directions_url(waypoints)).await?;
        decode_directions(&body)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    center: Option<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    code: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<[f64; 2]>,
}

/// Candidates of a geocoding response, best match first
///
/// Stops at the first feature without a `center`, so a centerless best match yields no
/// candidate instead of promoting a worse one.
pub fn decode_geocoding(body: &str) -> Result<Vec<Coordinates>> {
    let response: GeocodingResponse = serde_json::from_str(body).map_err(MapError::Decode)?;
    Ok(response
        .features
        .into_iter()
        .map_while(|feature| feature.center)
        .map(Coordinates::from_lon_lat)
        .collect())
}

/// Geometry of the first route of a directions response
pub fn decode_directions(body: &str) -> Result<Vec<Coordinates>> {
    let response: DirectionsResponse = serde_json::from_str(body).map_err(MapError::Decode)?;
    if response.code != "Ok" {
        return Err(MapError::NoRoute {
            code: response.code,
        });
    }
    let coordinates = response
        .routes
        .into_iter()
        .next()
        .and_then(|route| route.geometry)
        .map(|geometry| geometry.coordinates)
        .unwrap_or_default();
    if coordinates.is_empty() {
        return Err(MapError::EmptyGeometry);
    }
    Ok(coordinates
        .into_iter()
        .map(Coordinates::from_lon_lat)
        .collect())
}
