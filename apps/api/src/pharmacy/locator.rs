//! Pharmacy lookup: validates the location, asks the places service when it
//! can, and falls back to a fixed list so the response is never empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::pharmacy::geo::{format_miles, haversine_miles, is_valid_coordinate};
use crate::pharmacy::places::{LatLng, Place, PlacesClient};

/// Maximum pharmacies returned from a live search.
pub const MAX_RESULTS: usize = 10;

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";
const MAPS_EMBED_URL: &str = "https://www.google.com/maps/embed/v1/search";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PharmacyRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataSource {
    #[serde(rename = "Google Places API")]
    PlacesApi,
    #[serde(rename = "Mock Data")]
    MockData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyRecord {
    pub name: String,
    pub address: String,
    pub distance: String,
    pub phone: String,
    pub hours: String,
    pub rating: Option<f64>,
    pub is_open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyLookup {
    pub success: bool,
    pub location: String,
    pub google_maps_url: String,
    pub embed_map_url: String,
    pub pharmacies: Vec<PharmacyRecord>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub data_source: DataSource,
}

/// Where to search, after validation.
#[derive(Debug, Clone, PartialEq)]
enum SearchOrigin {
    Coordinates(LatLng),
    Address(String),
}

impl SearchOrigin {
    fn label(&self) -> String {
        match self {
            SearchOrigin::Coordinates(c) => format!("{},{}", c.lat, c.lng),
            SearchOrigin::Address(a) => a.clone(),
        }
    }
}

fn resolve_origin(request: &PharmacyRequest) -> Result<SearchOrigin, AppError> {
    if let (Some(lat), Some(lng)) = (request.latitude, request.longitude) {
        if !is_valid_coordinate(lat, lng) {
            return Err(AppError::Validation(
                "latitude must be within ±90 and longitude within ±180".to_string(),
            ));
        }
        return Ok(SearchOrigin::Coordinates(LatLng { lat, lng }));
    }

    match request.address.as_deref().map(str::trim) {
        Some(address) if !address.is_empty() => Ok(SearchOrigin::Address(address.to_string())),
        _ => Err(AppError::Validation(
            "Location (coordinates or address) is required".to_string(),
        )),
    }
}

pub async fn locate_pharmacies(
    places: &PlacesClient,
    request: &PharmacyRequest,
) -> Result<PharmacyLookup, AppError> {
    let origin = resolve_origin(request)?;
    let location = origin.label();

    let live = match &origin {
        SearchOrigin::Coordinates(coords) if places.api_key().is_some() => {
            match places.nearby_pharmacies(*coords).await {
                Ok(results) => to_records(*coords, results),
                Err(e) => {
                    warn!("Places search failed for {location}: {e}");
                    vec![]
                }
            }
        }
        _ => vec![],
    };

    let (pharmacies, data_source) = if live.is_empty() {
        info!("Using fallback pharmacy data for {location}");
        (fallback_pharmacies(), DataSource::MockData)
    } else {
        info!("Found {} pharmacies via places API", live.len());
        (live, DataSource::PlacesApi)
    };

    Ok(PharmacyLookup {
        success: true,
        google_maps_url: maps_search_url(&location),
        embed_map_url: embed_map_url(&location, places.api_key()),
        message: format!(
            "Found {} pharmacies near your location.",
            pharmacies.len()
        ),
        location,
        pharmacies,
        timestamp: Utc::now(),
        data_source,
    })
}

/// Keeps upstream order; only truncates.
fn to_records(origin: LatLng, places: Vec<Place>) -> Vec<PharmacyRecord> {
    places
        .into_iter()
        .take(MAX_RESULTS)
        .map(|place| {
            let at = place.geometry.location;
            let is_open = place
                .opening_hours
                .as_ref()
                .and_then(|h| h.open_now)
                .unwrap_or(false);
            PharmacyRecord {
                distance: format_miles(haversine_miles(origin.lat, origin.lng, at.lat, at.lng)),
                address: place
                    .vicinity
                    .or(place.formatted_address)
                    .unwrap_or_else(|| "Address not available".to_string()),
                phone: place
                    .formatted_phone_number
                    .unwrap_or_else(|| "Phone not available".to_string()),
                hours: if is_open { "Open now" } else { "Hours not available" }.to_string(),
                rating: place.rating,
                is_open,
                place_id: place.place_id,
                location: Some(at),
                name: place.name,
            }
        })
        .collect()
}

fn maps_search_url(location: &str) -> String {
    format!(
        "{MAPS_SEARCH_URL}pharmacy+near+{}",
        urlencoding::encode(location)
    )
}

fn embed_map_url(location: &str, api_key: Option<&str>) -> String {
    format!(
        "{MAPS_EMBED_URL}?key={}&q=pharmacy+near+{}&zoom=14",
        urlencoding::encode(api_key.unwrap_or_default()),
        urlencoding::encode(location)
    )
}

/// Placeholder list shown when no live results are available.
pub fn fallback_pharmacies() -> Vec<PharmacyRecord> {
    [
        ("CVS Pharmacy", "123 Main St", "0.2 miles", "(555) 123-4567", "8AM-10PM", 4.2, true),
        ("Walgreens", "456 Oak Ave", "0.4 miles", "(555) 234-5678", "7AM-11PM", 4.5, true),
        ("Rite Aid", "789 Pine Rd", "0.6 miles", "(555) 345-6789", "9AM-9PM", 4.1, true),
        ("Local Pharmacy", "321 Elm St", "0.8 miles", "(555) 456-7890", "9AM-6PM", 4.7, false),
    ]
    .into_iter()
    .map(
        |(name, address, distance, phone, hours, rating, is_open)| PharmacyRecord {
            name: name.to_string(),
            address: address.to_string(),
            distance: distance.to_string(),
            phone: phone.to_string(),
            hours: hours.to_string(),
            rating: Some(rating),
            is_open,
            place_id: None,
            location: None,
        },
    )
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn coords_request() -> PharmacyRequest {
        PharmacyRequest {
            latitude: Some(40.7128),
            longitude: Some(-74.0060),
            address: None,
        }
    }

    fn client_for(server: &MockServer, key: Option<&str>) -> PlacesClient {
        PlacesClient::new(server.uri(), key.map(str::to_string)).unwrap()
    }

    fn place(i: usize) -> serde_json::Value {
        json!({
            "name": format!("Pharmacy {i}"),
            "vicinity": format!("{i} Broadway"),
            "rating": 4.0,
            "place_id": format!("place-{i}"),
            "opening_hours": { "open_now": i % 2 == 0 },
            "geometry": { "location": { "lat": 40.7128 + 0.01 * i as f64, "lng": -74.0060 } }
        })
    }

    async fn mount_places(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .and(query_param("type", "pharmacy"))
            .and(query_param("radius", "5000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn assert_no_calls(server: &MockServer) {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_missing_location_is_validation_error_without_call() {
        let server = MockServer::start().await;
        assert_no_calls(&server).await;
        let client = client_for(&server, Some("key"));

        for request in [
            PharmacyRequest::default(),
            PharmacyRequest {
                latitude: Some(40.0),
                longitude: None,
                address: Some("   ".to_string()),
            },
        ] {
            let err = locate_pharmacies(&client, &request).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_out_of_range_coordinates_rejected() {
        let server = MockServer::start().await;
        assert_no_calls(&server).await;
        let request = PharmacyRequest {
            latitude: Some(123.0),
            longitude: Some(10.0),
            address: None,
        };
        let err = locate_pharmacies(&client_for(&server, Some("key")), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_live_results_are_mapped_and_capped() {
        let server = MockServer::start().await;
        let results: Vec<_> = (0..14).map(place).collect();
        mount_places(&server, json!({ "status": "OK", "results": results })).await;

        let lookup = locate_pharmacies(&client_for(&server, Some("key")), &coords_request())
            .await
            .unwrap();

        assert_eq!(lookup.data_source, DataSource::PlacesApi);
        assert_eq!(lookup.pharmacies.len(), MAX_RESULTS);
        // upstream order preserved
        assert_eq!(lookup.pharmacies[0].name, "Pharmacy 0");
        assert_eq!(lookup.pharmacies[9].name, "Pharmacy 9");
        assert_eq!(lookup.pharmacies[0].distance, "0.0 miles");
        assert_eq!(lookup.pharmacies[1].distance, "0.7 miles");
        assert_eq!(lookup.pharmacies[0].hours, "Open now");
        assert_eq!(lookup.pharmacies[1].hours, "Hours not available");
        assert_eq!(lookup.pharmacies[0].phone, "Phone not available");
        assert_eq!(lookup.location, "40.7128,-74.006");
    }

    #[tokio::test]
    async fn test_zero_results_use_fallback() {
        let server = MockServer::start().await;
        mount_places(&server, json!({ "status": "ZERO_RESULTS", "results": [] })).await;

        let lookup = locate_pharmacies(&client_for(&server, Some("key")), &coords_request())
            .await
            .unwrap();

        assert!(lookup.success);
        assert_eq!(lookup.data_source, DataSource::MockData);
        assert_eq!(lookup.pharmacies, fallback_pharmacies());
        assert_eq!(lookup.pharmacies.len(), 4);
    }

    #[tokio::test]
    async fn test_places_error_status_uses_fallback() {
        let server = MockServer::start().await;
        mount_places(
            &server,
            json!({ "status": "REQUEST_DENIED", "error_message": "The provided API key is invalid." }),
        )
        .await;

        let lookup = locate_pharmacies(&client_for(&server, Some("bad-key")), &coords_request())
            .await
            .unwrap();
        assert_eq!(lookup.data_source, DataSource::MockData);
        assert_eq!(lookup.pharmacies.len(), 4);
    }

    #[tokio::test]
    async fn test_places_http_failure_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let lookup = locate_pharmacies(&client_for(&server, Some("key")), &coords_request())
            .await
            .unwrap();
        assert_eq!(lookup.data_source, DataSource::MockData);
        assert_eq!(lookup.pharmacies, fallback_pharmacies());
    }

    #[tokio::test]
    async fn test_address_only_skips_places_call() {
        let server = MockServer::start().await;
        assert_no_calls(&server).await;
        let request = PharmacyRequest {
            latitude: None,
            longitude: None,
            address: Some("221B Baker Street, London".to_string()),
        };

        let lookup = locate_pharmacies(&client_for(&server, Some("key")), &request)
            .await
            .unwrap();
        assert_eq!(lookup.location, "221B Baker Street, London");
        assert_eq!(lookup.data_source, DataSource::MockData);
        assert_eq!(
            lookup.google_maps_url,
            "https://www.google.com/maps/search/pharmacy+near+221B%20Baker%20Street%2C%20London"
        );
    }

    #[tokio::test]
    async fn test_no_api_key_skips_places_call() {
        let server = MockServer::start().await;
        assert_no_calls(&server).await;

        let lookup = locate_pharmacies(&client_for(&server, None), &coords_request())
            .await
            .unwrap();
        assert_eq!(lookup.data_source, DataSource::MockData);
        assert!(lookup.embed_map_url.contains("key=&"));
    }

    #[test]
    fn test_data_source_labels() {
        assert_eq!(
            serde_json::to_value(DataSource::PlacesApi).unwrap(),
            json!("Google Places API")
        );
        assert_eq!(serde_json::to_value(DataSource::MockData).unwrap(), json!("Mock Data"));
    }
}
