mod directions;
mod location;
mod mode;
mod payload;
mod place;
mod route;
mod waypoint;

pub use directions::{Directions, Leg, RouteCandidate};
pub use location::Coordinates;
pub use mode::EditMode;
pub use payload::{PayloadNode, SubmissionPayload};
pub use place::{Place, PlaceSuggestion};
pub use route::{RouteDraft, RouteWindow, TripAttributes};
pub use route::{MAX_PICKUP_DISTANCE_KM, MAX_PRICE, MAX_SEATS};
pub use waypoint::Waypoint;

#[cfg(test)]
pub(crate) use route::{date, june_window};
