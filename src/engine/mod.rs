mod directions_api;
mod editor;
mod latest;
mod lookup_api;
mod payload;
mod route_api;
mod sequence;
mod session_api;
mod submission_api;
mod waypoint_api;

#[cfg(test)]
mod fakes;

pub use editor::{DirectionsTicket, LookupTicket, RouteEditor, LOOKUP_MIN_CHARS};
pub use latest::{Latest, Ticket};
pub use payload::build_submission_payload;
pub use sequence::{WaypointSequence, MAX_WAYPOINTS};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    api::API,
    config::Config,
    error::{unknown_session_error, Error},
    external::{
        mapbox::MapboxClient, routes_api::RoutesClient, DirectionsProvider, LocationProvider,
        PlaceLookup, RouteSubmitter,
    },
};

pub type DynPlaceLookup = Arc<dyn PlaceLookup + Send + Sync>;
pub type DynDirectionsProvider = Arc<dyn DirectionsProvider + Send + Sync>;
pub type DynRouteSubmitter = Arc<dyn RouteSubmitter + Send + Sync>;
pub type DynLocationProvider = Arc<dyn LocationProvider + Send + Sync>;

type Session = Arc<Mutex<RouteEditor>>;

pub struct Engine {
    places: DynPlaceLookup,
    directions: DynDirectionsProvider,
    submitter: DynRouteSubmitter,
    location: DynLocationProvider,
    lookup_debounce: Duration,
    max_waypoints: usize,
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl Engine {
    pub fn new(
        places: DynPlaceLookup,
        directions: DynDirectionsProvider,
        submitter: DynRouteSubmitter,
        location: DynLocationProvider,
    ) -> Self {
        Self {
            places,
            directions,
            submitter,
            location,
            lookup_debounce: Duration::ZERO,
            max_waypoints: MAX_WAYPOINTS,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    #[tracing::instrument(name = "Engine::from_config", skip_all)]
    pub fn from_config(config: &Config, location: DynLocationProvider) -> Self {
        let mapbox = Arc::new(MapboxClient::from_config(config));
        let routes = Arc::new(RoutesClient::from_config(config));

        Self::new(mapbox.clone(), mapbox, routes, location)
            .lookup_debounce(config.lookup_debounce)
            .max_waypoints(config.max_waypoints)
    }

    pub fn lookup_debounce(mut self, lookup_debounce: Duration) -> Self {
        self.lookup_debounce = lookup_debounce;
        self
    }

    /// Lowers the per-route stop limit. Values above [`MAX_WAYPOINTS`] are capped.
    pub fn max_waypoints(mut self, max_waypoints: usize) -> Self {
        self.max_waypoints = max_waypoints.min(MAX_WAYPOINTS);
        self
    }

    async fn session(&self, token: Uuid) -> Result<Session, Error> {
        self.sessions
            .lock()
            .await
            .get(&token)
            .cloned()
            .ok_or_else(|| unknown_session_error())
    }
}

impl API for Engine {}
