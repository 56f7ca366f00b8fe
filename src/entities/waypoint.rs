use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Coordinates, Place};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: Uuid,
    pub name: String,
    pub coordinates: Option<Coordinates>,
    pub scheduled_arrival: NaiveDate,
}

impl Waypoint {
    pub fn new(place: Place, scheduled_arrival: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: place.name,
            coordinates: Some(place.coordinates),
            scheduled_arrival,
        }
    }

    pub fn pending(name: impl Into<String>, scheduled_arrival: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            coordinates: None,
            scheduled_arrival,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.coordinates.is_some()
    }

    pub fn resolve(&mut self, place: Place) {
        self.name = place.name;
        self.coordinates = Some(place.coordinates);
    }

    pub fn place(&self) -> Option<Place> {
        self.coordinates
            .map(|coordinates| Place::new(self.name.clone(), coordinates))
    }
}
