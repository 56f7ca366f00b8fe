use geo_types::Point;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinates {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_valid(&self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<Coordinates> for Point<f64> {
    fn from(coordinates: Coordinates) -> Self {
        Point::new(coordinates.lng, coordinates.lat)
    }
}

impl From<Point<f64>> for Coordinates {
    fn from(point: Point<f64>) -> Self {
        Self {
            lng: point.x(),
            lat: point.y(),
        }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(coordinates: Coordinates) -> Self {
        [coordinates.lng, coordinates.lat]
    }
}

// providers expect "lng,lat"
impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        format!("{},{}", coordinates.lng, coordinates.lat)
    }
}

#[test]
fn coordinates_format_as_lng_lat() {
    let coordinates = Coordinates::new(4.8357, 45.764);
    let formatted: String = coordinates.into();

    assert_eq!(formatted, "4.8357,45.764");

    let point: Point<f64> = coordinates.into();
    assert_eq!(point.x(), 4.8357);
    assert_eq!(Coordinates::from(point), coordinates);
}

#[test]
fn coordinates_outside_of_range_are_invalid() {
    assert!(Coordinates::new(2.35, 48.85).is_valid());
    assert!(!Coordinates::new(200.0, 48.85).is_valid());
    assert!(!Coordinates::new(2.35, f64::NAN).is_valid());
}
