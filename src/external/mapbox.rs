use async_trait::async_trait;
use geo_types::LineString;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    entities::{Coordinates, Directions, Leg, PlaceSuggestion, RouteCandidate},
    error::{config_error, decoding_error, rejected_error, upstream_error, Error},
    external::{DirectionsProvider, PlaceLookup},
};

#[derive(Clone, Debug)]
pub struct MapboxClient {
    client: reqwest::Client,
    api_base: String,
    access_token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct GeocodingResponse {
    features: Vec<Feature>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Feature {
    place_name: String,
    center: [f64; 2],
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct DirectionsResponse {
    code: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct DirectionsRoute {
    distance: f64,
    duration: f64,
    legs: Vec<DirectionsLeg>,
    geometry: GeoJsonLine,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct DirectionsLeg {
    distance: f64,
    duration: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct GeoJsonLine {
    coordinates: Vec<[f64; 2]>,
}

impl MapboxClient {
    pub fn new(api_base: String, access_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            access_token,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.maps_api_base.clone(),
            config.maps_access_token.clone(),
        )
    }

    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = Url::parse(&format!("https://{}", self.api_base))
            .map_err(|_| config_error("MAPS_API_BASE"))?;

        url.path_segments_mut()
            .map_err(|_| config_error("MAPS_API_BASE"))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }
}

fn check_status(status_code: u16) -> Result<(), Error> {
    if (400..500).contains(&status_code) {
        return Err(rejected_error());
    } else if status_code != 200 {
        return Err(upstream_error());
    }

    Ok(())
}

fn suggestions_from(response: GeocodingResponse) -> Vec<PlaceSuggestion> {
    response
        .features
        .into_iter()
        .map(|feature| PlaceSuggestion {
            label: feature.place_name,
            coordinates: Coordinates::new(feature.center[0], feature.center[1]),
        })
        .filter(|suggestion| suggestion.coordinates.is_valid())
        .collect()
}

fn directions_from(response: DirectionsResponse) -> Result<Directions, Error> {
    match response.code.as_str() {
        "Ok" => (),
        "NoRoute" | "NoSegment" => return Ok(vec![]),
        code => {
            tracing::warn!("directions provider answered {}", code);
            return Err(upstream_error());
        }
    }

    Ok(response
        .routes
        .into_iter()
        .map(|route| RouteCandidate {
            distance: route.distance,
            duration: route.duration,
            legs: route
                .legs
                .into_iter()
                .map(|leg| Leg {
                    distance: leg.distance,
                    duration: leg.duration,
                })
                .collect(),
            path: LineString::from(
                route
                    .geometry
                    .coordinates
                    .into_iter()
                    .map(|[lng, lat]| (lng, lat))
                    .collect::<Vec<_>>(),
            ),
        })
        .collect())
}

#[async_trait]
impl PlaceLookup for MapboxClient {
    #[tracing::instrument(skip(self))]
    async fn find_places(
        &self,
        query: String,
        proximity: Option<Coordinates>,
    ) -> Result<Vec<PlaceSuggestion>, Error> {
        let path = format!("{}.json", query);
        let url = self.url(&["geocoding", "v5", "mapbox.places", path.as_str()])?;

        let mut request = self
            .client
            .get(url)
            .query(&[("access_token", self.access_token.as_str())])
            .query(&[("autocomplete", "true")]);

        if let Some(proximity) = proximity {
            let proximity: String = proximity.into();
            request = request.query(&[("proximity", proximity)]);
        }

        let res = request.send().await?;
        check_status(res.status().as_u16())?;

        let data: GeocodingResponse = res.json().await.map_err(decoding_error)?;

        Ok(suggestions_from(data))
    }
}

#[async_trait]
impl DirectionsProvider for MapboxClient {
    #[tracing::instrument(skip(self))]
    async fn find_directions(&self, coordinates: Vec<Coordinates>) -> Result<Directions, Error> {
        let waypoints = coordinates
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
            .join(";");
        let url = self.url(&["directions", "v5", "mapbox", "driving", waypoints.as_str()])?;

        let res = self
            .client
            .get(url)
            .query(&[("access_token", self.access_token.as_str())])
            .query(&[
                ("alternatives", "true"),
                ("geometries", "geojson"),
                ("overview", "full"),
            ])
            .send()
            .await?;

        check_status(res.status().as_u16())?;

        let data: DirectionsResponse = res.json().await.map_err(decoding_error)?;

        directions_from(data)
    }
}

#[test]
fn geocoding_features_become_suggestions() {
    let response: GeocodingResponse = serde_json::from_value(serde_json::json!({
        "type": "FeatureCollection",
        "features": [
            { "place_name": "Beaune, Côte-d'Or, France", "center": [4.84, 47.026] },
            { "place_name": "Nowhere", "center": [400.0, 47.0] }
        ]
    }))
    .unwrap();

    let suggestions = suggestions_from(response);

    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].label, "Beaune, Côte-d'Or, France");
    assert_eq!(suggestions[0].coordinates, Coordinates::new(4.84, 47.026));
}

#[test]
fn directions_routes_become_candidates() {
    let response: DirectionsResponse = serde_json::from_value(serde_json::json!({
        "code": "Ok",
        "routes": [{
            "distance": 12000.0,
            "duration": 900.0,
            "legs": [
                { "distance": 5000.0, "duration": 400.0, "summary": "A6" },
                { "distance": 7000.0, "duration": 500.0, "summary": "A31" }
            ],
            "geometry": {
                "type": "LineString",
                "coordinates": [[4.83, 45.76], [4.84, 47.02], [5.04, 47.32]]
            }
        }]
    }))
    .unwrap();

    let directions = directions_from(response).unwrap();

    assert_eq!(directions.len(), 1);
    assert_eq!(directions[0].legs.len(), 2);
    assert_eq!(directions[0].leg_distance_sum(), 12000.0);
    assert_eq!(directions[0].path.0.len(), 3);
}

#[test]
fn unroutable_stops_yield_no_candidates() {
    let response: DirectionsResponse =
        serde_json::from_value(serde_json::json!({ "code": "NoRoute" })).unwrap();
    assert_eq!(directions_from(response), Ok(vec![]));

    let response: DirectionsResponse =
        serde_json::from_value(serde_json::json!({ "code": "InvalidInput" })).unwrap();
    assert_eq!(directions_from(response), Err(upstream_error()));
}

#[test]
fn client_errors_are_rejections() {
    assert_eq!(check_status(200), Ok(()));
    assert_eq!(check_status(401), Err(rejected_error()));
    assert_eq!(check_status(503), Err(upstream_error()));
}

#[test]
fn urls_escape_free_text_queries() {
    let client = MapboxClient::new("api.mapbox.com".into(), "token".into());

    let url = client
        .url(&["geocoding", "v5", "mapbox.places", "Saint-Jean de Luz.json"])
        .unwrap();

    assert_eq!(
        url.as_str(),
        "https://api.mapbox.com/geocoding/v5/mapbox.places/Saint-Jean%20de%20Luz.json"
    );
}
