use std::env;
use std::time::Duration;

use crate::engine::MAX_WAYPOINTS;
use crate::error::{config_error, Error};

const DEFAULT_LOOKUP_DEBOUNCE_MS: u64 = 300;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub maps_api_base: String,
    pub maps_access_token: String,
    pub routes_api_base: String,
    pub lookup_debounce: Duration,
    pub max_waypoints: usize,
}

impl Config {
    /// Reads configuration from the environment, loading a `.env` file first if present.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        Ok(Self {
            maps_api_base: env::var("MAPS_API_BASE")?,
            maps_access_token: env::var("MAPS_ACCESS_TOKEN")?,
            routes_api_base: env::var("ROUTES_API_BASE")?,
            lookup_debounce: Duration::from_millis(optional_var(
                "LOOKUP_DEBOUNCE_MS",
                DEFAULT_LOOKUP_DEBOUNCE_MS,
            )?),
            max_waypoints: checked_max_waypoints(optional_var("MAX_WAYPOINTS", MAX_WAYPOINTS)?)?,
        })
    }
}

fn optional_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, Error> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| config_error(name)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err.into()),
    }
}

/// The stop limit can be lowered but never raised past what the directions
/// provider accepts in one request.
fn checked_max_waypoints(max_waypoints: usize) -> Result<usize, Error> {
    match max_waypoints {
        1..=MAX_WAYPOINTS => Ok(max_waypoints),
        _ => Err(config_error("MAX_WAYPOINTS")),
    }
}

/// Installs the fmt subscriber. Later calls are ignored once a subscriber is set.
pub fn init_tracing() {
    if tracing_subscriber::fmt().try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[test]
fn optional_vars_fall_back_and_reject_garbage() {
    env::remove_var("WAYFARER_TEST_UNSET");
    assert_eq!(optional_var("WAYFARER_TEST_UNSET", 7usize), Ok(7));

    env::set_var("WAYFARER_TEST_NUMBER", " 12 ");
    assert_eq!(optional_var("WAYFARER_TEST_NUMBER", 7usize), Ok(12));

    env::set_var("WAYFARER_TEST_GARBAGE", "twelve");
    assert_eq!(
        optional_var("WAYFARER_TEST_GARBAGE", 7usize),
        Err(config_error("WAYFARER_TEST_GARBAGE"))
    );
}

#[test]
fn stop_limit_stays_within_what_directions_accept() {
    assert_eq!(checked_max_waypoints(5), Ok(5));
    assert_eq!(checked_max_waypoints(MAX_WAYPOINTS), Ok(MAX_WAYPOINTS));
    assert_eq!(
        checked_max_waypoints(MAX_WAYPOINTS + 1),
        Err(config_error("MAX_WAYPOINTS"))
    );
    assert_eq!(checked_max_waypoints(0), Err(config_error("MAX_WAYPOINTS")));
}
