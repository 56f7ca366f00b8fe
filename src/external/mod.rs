pub mod location;
pub mod mapbox;
pub mod routes_api;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    entities::{Coordinates, Directions, EditMode, PlaceSuggestion, SubmissionPayload},
    error::Error,
};

#[async_trait]
pub trait PlaceLookup {
    async fn find_places(
        &self,
        query: String,
        proximity: Option<Coordinates>,
    ) -> Result<Vec<PlaceSuggestion>, Error>;
}

#[async_trait]
pub trait DirectionsProvider {
    /// Alternatives through `coordinates` in the given order, preferred first.
    async fn find_directions(&self, coordinates: Vec<Coordinates>) -> Result<Directions, Error>;
}

#[async_trait]
pub trait RouteSubmitter {
    async fn submit_route(
        &self,
        mode: &EditMode,
        payload: &SubmissionPayload,
    ) -> Result<Value, Error>;
}

/// Where the user currently is, if known. Used to bias place lookups.
pub trait LocationProvider {
    fn current_location(&self) -> Option<Coordinates>;
}
