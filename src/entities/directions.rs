use geo_types::LineString;
use serde::{Deserialize, Serialize};

/// Portion of a route between two consecutive stops, in metres and seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub distance: f64,
    pub duration: f64,
}

/// One alternative returned by the directions provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteCandidate {
    pub distance: f64,
    pub duration: f64,
    pub legs: Vec<Leg>,
    pub path: LineString<f64>,
}

impl RouteCandidate {
    pub fn leg_distance_sum(&self) -> f64 {
        self.legs.iter().map(|leg| leg.distance).sum()
    }
}

pub type Directions = Vec<RouteCandidate>;
