use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{
    Directions, EditMode, Place, PlaceSuggestion, RouteCandidate, RouteDraft, RouteWindow,
    TripAttributes, Waypoint,
};
use crate::error::Error;

#[async_trait]
pub trait SessionAPI {
    async fn open_session(&self, mode: EditMode, draft: RouteDraft) -> Result<Uuid, Error>;
    async fn find_session(&self, token: Uuid) -> Result<RouteDraft, Error>;
    async fn close_session(&self, token: Uuid) -> Result<(), Error>;
}

#[async_trait]
pub trait WaypointAPI {
    async fn add_waypoint(
        &self,
        token: Uuid,
        place: Place,
        scheduled_arrival: NaiveDate,
    ) -> Result<Vec<Waypoint>, Error>;
    async fn add_pending_waypoint(
        &self,
        token: Uuid,
        name: String,
        scheduled_arrival: NaiveDate,
    ) -> Result<Vec<Waypoint>, Error>;
    async fn resolve_waypoint(
        &self,
        token: Uuid,
        id: Uuid,
        place: Place,
    ) -> Result<Vec<Waypoint>, Error>;
    async fn remove_waypoint(&self, token: Uuid, id: Uuid) -> Result<Vec<Waypoint>, Error>;
    async fn update_waypoint_date(
        &self,
        token: Uuid,
        id: Uuid,
        new_date: NaiveDate,
    ) -> Result<Vec<Waypoint>, Error>;
}

#[async_trait]
pub trait RouteAPI {
    async fn set_origin(&self, token: Uuid, place: Place) -> Result<(), Error>;
    async fn set_destination(&self, token: Uuid, place: Place) -> Result<(), Error>;
    async fn change_window(&self, token: Uuid, window: RouteWindow) -> Result<usize, Error>;
    async fn set_attributes(&self, token: Uuid, attributes: TripAttributes) -> Result<(), Error>;
}

#[async_trait]
pub trait LookupAPI {
    /// `None` when the query was too short or superseded by a newer one.
    async fn suggest_places(
        &self,
        token: Uuid,
        query: String,
    ) -> Result<Option<Vec<PlaceSuggestion>>, Error>;
    async fn find_suggestions(&self, token: Uuid) -> Result<Vec<PlaceSuggestion>, Error>;
}

#[async_trait]
pub trait DirectionsAPI {
    /// `None` when a stop is unresolved or the stops changed while waiting.
    async fn calculate_directions(&self, token: Uuid) -> Result<Option<Directions>, Error>;
    async fn select_candidate(&self, token: Uuid, index: usize) -> Result<RouteCandidate, Error>;
}

#[async_trait]
pub trait SubmissionAPI {
    async fn validate_route(&self, token: Uuid) -> Result<(), Error>;
    async fn submit_route(&self, token: Uuid) -> Result<Value, Error>;
}

pub trait API:
    SessionAPI + WaypointAPI + RouteAPI + LookupAPI + DirectionsAPI + SubmissionAPI
{
}

pub type DynAPI = Arc<dyn API + Send + Sync>;
