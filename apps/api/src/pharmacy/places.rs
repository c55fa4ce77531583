//! Places API client: nearby search for pharmacies.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";
/// Search radius in metres.
pub const SEARCH_RADIUS_METERS: u32 = 5000;
pub const PLACE_TYPE: &str = "pharmacy";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Places API returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Places API status {status}: {message}")]
    Status { status: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct NearbySearchResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<Place>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub name: String,
    pub vicinity: Option<String>,
    pub formatted_address: Option<String>,
    pub formatted_phone_number: Option<String>,
    pub opening_hours: Option<OpeningHours>,
    pub rating: Option<f64>,
    pub place_id: Option<String>,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpeningHours {
    pub open_now: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Clone)]
pub struct PlacesClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PlacesClient {
    pub fn new(base_url: String, api_key: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Pharmacies near `origin`, in the service's own relevance order.
    /// `ZERO_RESULTS` is an empty list, any other non-`OK` status an error.
    /// Returns an empty list without a call when no key is configured.
    pub async fn nearby_pharmacies(&self, origin: LatLng) -> Result<Vec<Place>, PlacesError> {
        let Some(key) = self.api_key.as_deref() else {
            return Ok(vec![]);
        };

        let location = format!("{},{}", origin.lat, origin.lng);
        let radius = SEARCH_RADIUS_METERS.to_string();
        let response = self
            .client
            .get(format!("{}/nearbysearch/json", self.base_url))
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", PLACE_TYPE),
                ("key", key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::HttpStatus(status.as_u16()));
        }

        let body: NearbySearchResponse = response.json().await?;
        debug!(
            "Places nearby search: status={}, results={}",
            body.status,
            body.results.len()
        );

        match body.status.as_str() {
            "OK" => Ok(body.results),
            "ZERO_RESULTS" => Ok(vec![]),
            _ => Err(PlacesError::Status {
                status: body.status,
                message: body.error_message.unwrap_or_default(),
            }),
        }
    }
}
