use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    entities::{Place, RouteWindow, Waypoint},
    error::{
        invalid_coordinates_error, out_of_order_error, outside_window_error, too_many_stops_error,
        unresolved_stop_error, Error,
    },
};

pub const MAX_WAYPOINTS: usize = 23;

/// Ordered stops between a route's origin and destination.
///
/// Insertion order is travel order: stops are never re-sorted. Ordering between
/// neighbouring dates is only checked by [`WaypointSequence::validate`], which runs
/// right before a route is submitted.
#[derive(Clone, Debug, PartialEq)]
pub struct WaypointSequence {
    window: RouteWindow,
    waypoints: Vec<Waypoint>,
    max_waypoints: usize,
}

impl WaypointSequence {
    pub fn new(window: RouteWindow) -> Self {
        Self::with_waypoints(window, vec![])
    }

    pub fn with_waypoints(window: RouteWindow, waypoints: Vec<Waypoint>) -> Self {
        Self {
            window,
            waypoints,
            max_waypoints: MAX_WAYPOINTS,
        }
    }

    pub fn max_waypoints(mut self, max_waypoints: usize) -> Self {
        self.max_waypoints = max_waypoints;
        self
    }

    pub fn window(&self) -> &RouteWindow {
        &self.window
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn find(&self, id: Uuid) -> Option<&Waypoint> {
        self.waypoints.iter().find(|waypoint| waypoint.id == id)
    }

    #[tracing::instrument(skip(self))]
    pub fn add_waypoint(
        &mut self,
        place: Place,
        scheduled_arrival: NaiveDate,
    ) -> Result<&[Waypoint], Error> {
        let waypoint = Waypoint::new(place, scheduled_arrival);
        self.push(waypoint)
    }

    /// Appends a stop typed by the user that has not been matched to a place yet.
    #[tracing::instrument(skip(self))]
    pub fn add_pending_waypoint(
        &mut self,
        name: String,
        scheduled_arrival: NaiveDate,
    ) -> Result<&[Waypoint], Error> {
        let waypoint = Waypoint::pending(name, scheduled_arrival);
        self.push(waypoint)
    }

    fn push(&mut self, waypoint: Waypoint) -> Result<&[Waypoint], Error> {
        if self.waypoints.len() >= self.max_waypoints {
            return Err(too_many_stops_error(self.max_waypoints));
        }

        if waypoint.coordinates.map_or(false, |c| !c.is_valid()) {
            return Err(invalid_coordinates_error(&waypoint.name));
        }

        if !self.window.contains(waypoint.scheduled_arrival) {
            return Err(outside_window_error(&waypoint.name));
        }

        self.waypoints.push(waypoint);

        Ok(&self.waypoints)
    }

    pub fn resolve_waypoint(&mut self, id: Uuid, place: Place) -> Result<&[Waypoint], Error> {
        if !place.coordinates.is_valid() {
            return Err(invalid_coordinates_error(&place.name));
        }

        match self.waypoints.iter_mut().find(|waypoint| waypoint.id == id) {
            Some(waypoint) => waypoint.resolve(place),
            None => tracing::debug!("waypoint {} is gone, ignoring resolution", id),
        }

        Ok(&self.waypoints)
    }

    pub fn remove_waypoint(&mut self, id: Uuid) -> &[Waypoint] {
        self.waypoints.retain(|waypoint| waypoint.id != id);
        &self.waypoints
    }

    #[tracing::instrument(skip(self))]
    pub fn update_waypoint_date(&mut self, id: Uuid, new_date: NaiveDate) -> Result<(), Error> {
        let window = self.window;

        let waypoint = match self.waypoints.iter_mut().find(|waypoint| waypoint.id == id) {
            Some(waypoint) => waypoint,
            None => {
                tracing::debug!("waypoint {} is gone, ignoring date change", id);
                return Ok(());
            }
        };

        if !window.contains(new_date) {
            return Err(outside_window_error(&waypoint.name));
        }

        waypoint.scheduled_arrival = new_date;

        Ok(())
    }

    /// Installs a new departure/arrival window. Stops still scheduled on the old
    /// departure date were never given a date of their own and follow the new one.
    /// Returns how many stops moved.
    #[tracing::instrument(skip(self))]
    pub fn recompute_after_route_change(&mut self, window: RouteWindow) -> usize {
        let previous_departure = self.window.departure_date;
        let mut shifted = 0;

        for waypoint in self.waypoints.iter_mut() {
            if waypoint.scheduled_arrival == previous_departure {
                waypoint.scheduled_arrival = window.departure_date;
                shifted += 1;
            }
        }

        self.window = window;

        shifted
    }

    /// Fails on the first stop that is unresolved or mislocated, outside the window, or scheduled
    /// before the stop preceding it.
    pub fn validate(&self) -> Result<(), Error> {
        let mut previous = self.window.departure_date;

        for waypoint in self.waypoints.iter() {
            match waypoint.coordinates {
                None => return Err(unresolved_stop_error(&waypoint.name)),
                Some(coordinates) if !coordinates.is_valid() => {
                    return Err(invalid_coordinates_error(&waypoint.name))
                }
                Some(_) => (),
            }

            if !self.window.contains(waypoint.scheduled_arrival) {
                return Err(outside_window_error(&waypoint.name));
            }

            if waypoint.scheduled_arrival < previous {
                return Err(out_of_order_error(&waypoint.name));
            }

            previous = waypoint.scheduled_arrival;
        }

        Ok(())
    }

    pub fn into_waypoints(self) -> Vec<Waypoint> {
        self.waypoints
    }
}

#[cfg(test)]
fn place(name: &str) -> Place {
    use crate::entities::Coordinates;

    Place::new(name, Coordinates::new(4.8, 45.7))
}

#[test]
fn add_waypoint_appends_in_insertion_order() {
    use crate::entities::{date, june_window};

    let mut sequence = WaypointSequence::new(june_window());

    sequence
        .add_waypoint(place("Dijon"), date(2024, 6, 2))
        .unwrap();
    let waypoints = sequence
        .add_waypoint(place("Beaune"), date(2024, 6, 1))
        .unwrap();

    let names: Vec<&str> = waypoints.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["Dijon", "Beaune"]);
}

#[test]
fn add_waypoint_rejects_dates_outside_window() {
    use crate::entities::{date, june_window};

    let mut sequence = WaypointSequence::new(june_window());

    let result = sequence.add_waypoint(place("Dijon"), date(2024, 6, 4));
    assert_eq!(result.unwrap_err(), outside_window_error("Dijon"));

    let result = sequence.add_waypoint(place("Dijon"), date(2024, 5, 31));
    assert!(result.unwrap_err().is_validation());
    assert!(sequence.is_empty());
}

#[test]
fn add_waypoint_stops_at_maximum() {
    use crate::entities::{date, june_window};

    let mut sequence = WaypointSequence::new(june_window());

    for i in 0..MAX_WAYPOINTS {
        sequence
            .add_waypoint(place(&format!("stop {}", i)), date(2024, 6, 2))
            .unwrap();
    }

    let result = sequence.add_waypoint(place("one too many"), date(2024, 6, 2));
    assert_eq!(result.unwrap_err(), too_many_stops_error(MAX_WAYPOINTS));
    assert_eq!(sequence.len(), MAX_WAYPOINTS);
}

#[test]
fn remove_unknown_waypoint_is_a_no_op() {
    use crate::entities::{date, june_window};

    let mut sequence = WaypointSequence::new(june_window());
    sequence
        .add_waypoint(place("Dijon"), date(2024, 6, 2))
        .unwrap();
    let before = sequence.clone();

    sequence.remove_waypoint(Uuid::new_v4());

    assert_eq!(sequence, before);
}

#[test]
fn remove_waypoint_keeps_remaining_order() {
    use crate::entities::{date, june_window};

    let mut sequence = WaypointSequence::new(june_window());
    sequence.add_waypoint(place("A"), date(2024, 6, 1)).unwrap();
    sequence.add_waypoint(place("B"), date(2024, 6, 2)).unwrap();
    sequence.add_waypoint(place("C"), date(2024, 6, 3)).unwrap();

    let id = sequence.waypoints()[1].id;
    let waypoints = sequence.remove_waypoint(id);

    let names: Vec<&str> = waypoints.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["A", "C"]);
}

#[test]
fn update_waypoint_date_checks_window_only() {
    use crate::entities::{date, june_window};

    let mut sequence = WaypointSequence::new(june_window());
    sequence.add_waypoint(place("A"), date(2024, 6, 3)).unwrap();
    sequence.add_waypoint(place("B"), date(2024, 6, 3)).unwrap();

    let id = sequence.waypoints()[1].id;

    assert!(sequence.update_waypoint_date(id, date(2024, 6, 9)).is_err());
    assert_eq!(sequence.waypoints()[1].scheduled_arrival, date(2024, 6, 3));

    // earlier than its neighbour, accepted until submission
    sequence.update_waypoint_date(id, date(2024, 6, 1)).unwrap();
    assert_eq!(sequence.waypoints()[1].scheduled_arrival, date(2024, 6, 1));
    assert_eq!(sequence.validate(), Err(out_of_order_error("B")));

    assert!(sequence
        .update_waypoint_date(Uuid::new_v4(), date(2024, 6, 2))
        .is_ok());
}

#[test]
fn recompute_moves_only_default_following_stops() {
    use crate::entities::{date, june_window};

    let mut sequence = WaypointSequence::new(june_window());
    sequence.add_waypoint(place("A"), date(2024, 6, 1)).unwrap();
    sequence.add_waypoint(place("B"), date(2024, 6, 2)).unwrap();

    let mut window = june_window();
    window.departure_date = date(2024, 6, 2);
    window.end_date = date(2024, 6, 5);

    let shifted = sequence.recompute_after_route_change(window);

    assert_eq!(shifted, 1);
    assert_eq!(sequence.waypoints()[0].scheduled_arrival, date(2024, 6, 2));
    assert_eq!(sequence.waypoints()[1].scheduled_arrival, date(2024, 6, 2));
    assert_eq!(sequence.window(), &window);
}

#[test]
fn validate_reports_the_first_out_of_order_stop() {
    use crate::entities::{date, june_window};

    let mut sequence = WaypointSequence::new(june_window());
    sequence
        .add_waypoint(place("Dijon"), date(2024, 6, 2))
        .unwrap();
    sequence
        .add_waypoint(place("Beaune"), date(2024, 6, 1))
        .unwrap();

    let err = sequence.validate().unwrap_err();
    assert_eq!(err, out_of_order_error("Beaune"));
    assert_eq!(err.subject.as_deref(), Some("Beaune"));
}

#[test]
fn validate_rejects_unresolved_stops_first() {
    use crate::entities::{date, june_window};

    let mut sequence = WaypointSequence::new(june_window());
    sequence
        .add_pending_waypoint("somewhere near Lyon".into(), date(2024, 6, 2))
        .unwrap();
    sequence
        .add_waypoint(place("Beaune"), date(2024, 6, 1))
        .unwrap();

    assert_eq!(
        sequence.validate(),
        Err(unresolved_stop_error("somewhere near Lyon"))
    );

    let id = sequence.waypoints()[0].id;
    sequence.resolve_waypoint(id, place("Lyon")).unwrap();

    assert_eq!(sequence.validate(), Err(out_of_order_error("Beaune")));
}

#[test]
fn validate_catches_stops_left_outside_a_shrunk_window() {
    use crate::entities::{date, june_window};

    let mut sequence = WaypointSequence::new(june_window());
    sequence.add_waypoint(place("A"), date(2024, 6, 3)).unwrap();

    let mut window = june_window();
    window.end_date = date(2024, 6, 2);
    sequence.recompute_after_route_change(window);

    assert_eq!(sequence.validate(), Err(outside_window_error("A")));
}

#[test]
fn accepted_sequences_are_monotonic_and_contained() {
    use crate::entities::{date, june_window};

    let window = june_window();
    let days = [1, 1, 2, 2, 3];

    let mut sequence = WaypointSequence::new(window);
    for (i, day) in days.iter().enumerate() {
        sequence
            .add_waypoint(place(&format!("stop {}", i)), date(2024, 6, *day))
            .unwrap();
    }

    assert!(sequence.validate().is_ok());

    let waypoints = sequence.waypoints();
    for pair in waypoints.windows(2) {
        assert!(pair[0].scheduled_arrival <= pair[1].scheduled_arrival);
    }
    for waypoint in waypoints {
        assert!(window.contains(waypoint.scheduled_arrival));
    }
}

#[test]
fn stops_without_usable_coordinates_are_rejected() {
    use crate::entities::{date, june_window, Coordinates};

    let mut sequence = WaypointSequence::new(june_window());

    let nowhere = Place::new("Nowhere", Coordinates::new(f64::NAN, 47.0));
    let result = sequence.add_waypoint(nowhere, date(2024, 6, 2));
    assert_eq!(result.unwrap_err(), invalid_coordinates_error("Nowhere"));

    let off_the_map = Place::new("Off the map", Coordinates::new(4.8, 95.0));
    assert!(sequence.add_waypoint(off_the_map, date(2024, 6, 2)).is_err());
    assert!(sequence.is_empty());

    sequence
        .add_pending_waypoint("near Beaune".into(), date(2024, 6, 2))
        .unwrap();
    let id = sequence.waypoints()[0].id;

    let bad = Place::new("Beaune?", Coordinates::new(f64::INFINITY, 47.0));
    let err = sequence.resolve_waypoint(id, bad).unwrap_err();
    assert_eq!(err, invalid_coordinates_error("Beaune?"));
    assert!(err.is_validation());
    assert!(!sequence.waypoints()[0].is_resolved());
}

#[test]
fn validate_names_stops_loaded_with_bad_coordinates() {
    use crate::entities::{date, june_window, Coordinates};

    let loaded = Waypoint::new(
        Place::new("Corrupt", Coordinates::new(f64::NAN, f64::NAN)),
        date(2024, 6, 2),
    );
    let sequence = WaypointSequence::with_waypoints(june_window(), vec![loaded]);

    assert_eq!(sequence.validate(), Err(invalid_coordinates_error("Corrupt")));
}
