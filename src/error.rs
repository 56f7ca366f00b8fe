use std::env;
use std::fmt::{self, Debug, Display};

#[derive(Clone, Debug, PartialEq)]
pub struct Error {
    pub code: i32,
    pub message: String,
    pub subject: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Provider,
    Validation,
    Payload,
    Session,
}

impl Error {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            subject: None,
        }
    }

    fn about(code: i32, message: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            subject: Some(subject.into()),
        }
    }

    pub fn category(&self) -> Category {
        match self.code {
            1..=99 => Category::Provider,
            100..=199 => Category::Validation,
            200..=299 => Category::Payload,
            _ => Category::Session,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.category() == Category::Validation
    }

    pub fn is_payload(&self) -> bool {
        self.category() == Category::Payload
    }

    pub fn is_provider(&self) -> bool {
        self.category() == Category::Provider
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subject {
            Some(subject) => write!(f, "{}: {}", subject, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        decoding_error(err)
    }
}

// provider errors

pub fn env_var_error(err: env::VarError) -> Error {
    tracing::error!("environment variable error: {}", err);
    Error::new(1, "environment variable error")
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    tracing::warn!("request failed: {}", err);
    Error::new(2, "request failed")
}

pub fn upstream_error() -> Error {
    Error::new(3, "upstream error")
}

pub fn decoding_error<T: Debug>(err: T) -> Error {
    tracing::warn!("could not decode provider response: {:?}", err);
    Error::new(4, "unexpected provider response")
}

pub fn config_error(variable: &str) -> Error {
    Error::about(5, "invalid configuration value", variable)
}

pub fn rejected_error() -> Error {
    Error::new(6, "request rejected by provider")
}

// validation errors

pub fn too_many_stops_error(max_stops: usize) -> Error {
    Error::new(
        100,
        format!("a route cannot have more than {} stops", max_stops),
    )
}

pub fn outside_window_error(stop: &str) -> Error {
    Error::about(101, "date is outside of the trip's departure and end dates", stop)
}

pub fn unresolved_stop_error(stop: &str) -> Error {
    Error::about(102, "stop has not been matched to a known place", stop)
}

pub fn out_of_order_error(stop: &str) -> Error {
    Error::about(103, "date is earlier than the previous stop", stop)
}

pub fn arrival_before_departure_error() -> Error {
    Error::about(104, "arrival must be after departure", "arrivalWindow")
}

pub fn missing_place_error(field: &str) -> Error {
    Error::about(105, "place is required", field)
}

pub fn out_of_bounds_error(field: &str) -> Error {
    Error::about(106, "value is out of the allowed range", field)
}

pub fn invalid_coordinates_error(subject: &str) -> Error {
    Error::about(107, "place has no usable coordinates", subject)
}

// payload errors

pub fn leg_count_mismatch_error(legs: usize, waypoints: usize) -> Error {
    Error::new(
        200,
        format!(
            "route has {} legs for {} stops, recalculate the route",
            legs, waypoints
        ),
    )
}

pub fn distance_mismatch_error() -> Error {
    Error::new(201, "route distances are inconsistent, recalculate the route")
}

pub fn route_not_calculated_error() -> Error {
    Error::new(202, "route has not been calculated")
}

pub fn stale_route_error() -> Error {
    Error::new(203, "route changed since it was calculated, recalculate the route")
}

// session errors

pub fn unknown_session_error() -> Error {
    Error::new(300, "unknown editing session")
}

pub fn invalid_candidate_error(index: usize) -> Error {
    Error::about(301, "no such route alternative", index.to_string())
}

pub fn submission_in_progress_error() -> Error {
    Error::new(302, "route is already being submitted")
}

#[test]
fn categories_follow_code_ranges() {
    assert_eq!(upstream_error().category(), Category::Provider);
    assert_eq!(out_of_order_error("Lyon").category(), Category::Validation);
    assert_eq!(leg_count_mismatch_error(1, 1).category(), Category::Payload);
    assert_eq!(unknown_session_error().category(), Category::Session);
}

#[test]
fn display_names_the_subject() {
    let err = out_of_order_error("Lyon");

    assert_eq!(err.subject.as_deref(), Some("Lyon"));
    assert_eq!(
        err.to_string(),
        "Lyon: date is earlier than the previous stop"
    );
    assert_eq!(upstream_error().to_string(), "upstream error");
}
