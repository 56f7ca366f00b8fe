use std::sync::RwLock;

use crate::entities::Coordinates;
use crate::external::LocationProvider;

/// Location reported by the client, updated whenever the device reports a new fix.
#[derive(Debug, Default)]
pub struct ReportedLocation {
    coordinates: RwLock<Option<Coordinates>>,
}

impl ReportedLocation {
    pub fn new(coordinates: Option<Coordinates>) -> Self {
        Self {
            coordinates: RwLock::new(coordinates),
        }
    }

    pub fn report(&self, coordinates: Coordinates) {
        match self.coordinates.write() {
            Ok(mut current) => *current = Some(coordinates),
            Err(_) => tracing::warn!("location lock poisoned, dropping fix"),
        }
    }

    pub fn clear(&self) {
        if let Ok(mut current) = self.coordinates.write() {
            *current = None;
        }
    }
}

impl LocationProvider for ReportedLocation {
    fn current_location(&self) -> Option<Coordinates> {
        self.coordinates.read().ok().and_then(|current| *current)
    }
}

#[test]
fn reported_location_tracks_latest_fix() {
    let location = ReportedLocation::default();
    assert_eq!(location.current_location(), None);

    location.report(Coordinates::new(4.83, 45.76));
    location.report(Coordinates::new(5.04, 47.32));
    assert_eq!(
        location.current_location(),
        Some(Coordinates::new(5.04, 47.32))
    );

    location.clear();
    assert_eq!(location.current_location(), None);
}
