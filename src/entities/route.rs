use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::entities::{Place, Waypoint};
use crate::error::{arrival_before_departure_error, out_of_bounds_error, Error};

pub const MAX_SEATS: u8 = 6;
pub const MAX_PRICE: f64 = 10_000.0;
pub const MAX_PICKUP_DISTANCE_KM: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteWindow {
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
}

impl RouteWindow {
    pub fn new(
        departure_date: NaiveDate,
        departure_time: NaiveTime,
        end_date: NaiveDate,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            departure_date,
            departure_time,
            end_date,
            end_time,
        }
    }

    pub fn departure(&self) -> NaiveDateTime {
        self.departure_date.and_time(self.departure_time)
    }

    pub fn arrival(&self) -> NaiveDateTime {
        self.end_date.and_time(self.end_time)
    }

    /// Whether a stop scheduled on `date` fits between departure and end dates, inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.departure_date <= date && date <= self.end_date
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.arrival() <= self.departure() {
            return Err(arrival_before_departure_error());
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripAttributes {
    pub seats_available: u8,
    pub price: f64,
    /// Kilometres a driver is willing to detour to pick a passenger up.
    pub max_pickup_distance: f64,
    pub is_negotiable: bool,
}

impl Default for TripAttributes {
    fn default() -> Self {
        Self {
            seats_available: 1,
            price: 0.0,
            max_pickup_distance: 0.0,
            is_negotiable: false,
        }
    }
}

impl TripAttributes {
    pub fn validate(&self) -> Result<(), Error> {
        if !(1..=MAX_SEATS).contains(&self.seats_available) {
            return Err(out_of_bounds_error("seatsAvailable"));
        }

        if !self.price.is_finite() || !(0.0..=MAX_PRICE).contains(&self.price) {
            return Err(out_of_bounds_error("price"));
        }

        if !self.max_pickup_distance.is_finite()
            || !(0.0..=MAX_PICKUP_DISTANCE_KM).contains(&self.max_pickup_distance)
        {
            return Err(out_of_bounds_error("maxPickupDistance"));
        }

        Ok(())
    }
}

/// Route as held while a create, update or clone dialog is open.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteDraft {
    pub origin: Option<Place>,
    pub destination: Option<Place>,
    pub window: RouteWindow,
    pub attributes: TripAttributes,
    pub waypoints: Vec<Waypoint>,
}

impl RouteDraft {
    pub fn new(window: RouteWindow) -> Self {
        Self {
            origin: None,
            destination: None,
            window,
            attributes: TripAttributes::default(),
            waypoints: vec![],
        }
    }
}

#[cfg(test)]
pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[cfg(test)]
pub(crate) fn june_window() -> RouteWindow {
    RouteWindow::new(
        date(2024, 6, 1),
        NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        date(2024, 6, 3),
        NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
    )
}

#[test]
fn window_contains_its_bounds() {
    let window = june_window();

    assert!(window.contains(date(2024, 6, 1)));
    assert!(window.contains(date(2024, 6, 3)));
    assert!(!window.contains(date(2024, 5, 31)));
    assert!(!window.contains(date(2024, 6, 4)));
}

#[test]
fn arrival_must_follow_departure() {
    let mut window = june_window();
    assert!(window.validate().is_ok());

    window.end_date = window.departure_date;
    window.end_time = window.departure_time;
    assert_eq!(window.validate(), Err(arrival_before_departure_error()));

    // same day, later hour
    window.end_time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    assert!(window.validate().is_ok());
}

#[test]
fn trip_attributes_respect_bounds() {
    let mut attributes = TripAttributes {
        seats_available: 3,
        price: 25.0,
        max_pickup_distance: 5.0,
        is_negotiable: true,
    };
    assert!(attributes.validate().is_ok());

    attributes.seats_available = 7;
    assert_eq!(
        attributes.validate(),
        Err(out_of_bounds_error("seatsAvailable"))
    );

    attributes.seats_available = 0;
    assert!(attributes.validate().is_err());

    attributes.seats_available = 6;
    attributes.price = f64::INFINITY;
    assert_eq!(attributes.validate(), Err(out_of_bounds_error("price")));

    attributes.price = 25.0;
    attributes.max_pickup_distance = 51.0;
    assert_eq!(
        attributes.validate(),
        Err(out_of_bounds_error("maxPickupDistance"))
    );
}
