use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub coordinates: Coordinates,
}

impl Place {
    pub fn new(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            coordinates,
        }
    }
}

/// A geocoder candidate for a typed query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub label: String,
    pub coordinates: Coordinates,
}

impl From<PlaceSuggestion> for Place {
    fn from(suggestion: PlaceSuggestion) -> Self {
        Place::new(suggestion.label, suggestion.coordinates)
    }
}
