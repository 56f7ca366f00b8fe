use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stop of the submitted route, origin and destination included.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadNode {
    pub name: String,
    pub coordinates: [f64; 2],
    pub cumulative_distance: f64,
    pub arrival_timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_id: Option<String>,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub waypoints: Vec<PayloadNode>,
    pub path: Vec<[f64; 2]>,
    pub distance: f64,
    pub duration: f64,
    pub seats_available: u8,
    pub price: f64,
    pub max_pickup_distance: f64,
    pub is_negotiable: bool,
}

impl SubmissionPayload {
    pub fn cumulative_distances(&self) -> Vec<f64> {
        self.waypoints
            .iter()
            .map(|node| node.cumulative_distance)
            .collect()
    }
}
