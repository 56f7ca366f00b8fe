use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

use super::Engine;

use crate::{
    entities::{
        june_window, Coordinates, Directions, EditMode, Place, PlaceSuggestion, RouteDraft,
        SubmissionPayload,
    },
    error::{upstream_error, Error},
    external::{
        location::ReportedLocation, DirectionsProvider, PlaceLookup, RouteSubmitter,
    },
};

/// Answers `"<query> (result)"`, fails for queries starting with "fail", and holds
/// gated queries until released.
#[derive(Default)]
pub struct FakePlaces {
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<(String, Option<Coordinates>)>>,
}

impl FakePlaces {
    pub fn gate(&self, query: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(query.to_string(), rx);
        tx
    }

    pub async fn wait_for_calls(&self, count: usize) {
        while self.calls.lock().unwrap().len() < count {
            tokio::task::yield_now().await;
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(query, _)| query.clone())
            .collect()
    }

    pub fn proximities(&self) -> Vec<Option<Coordinates>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, proximity)| *proximity)
            .collect()
    }
}

#[async_trait]
impl PlaceLookup for FakePlaces {
    async fn find_places(
        &self,
        query: String,
        proximity: Option<Coordinates>,
    ) -> Result<Vec<PlaceSuggestion>, Error> {
        let gate = self.gates.lock().unwrap().remove(&query);
        self.calls.lock().unwrap().push((query.clone(), proximity));

        if let Some(gate) = gate {
            gate.await.ok();
        }

        if query.starts_with("fail") {
            return Err(upstream_error());
        }

        Ok(vec![PlaceSuggestion {
            label: format!("{} (result)", query),
            coordinates: Coordinates::new(4.84, 47.026),
        }])
    }
}

pub struct FakeDirections {
    result: Mutex<Result<Directions, Error>>,
    calls: Mutex<Vec<Vec<Coordinates>>>,
}

impl FakeDirections {
    pub fn answer(&self, result: Result<Directions, Error>) {
        *self.result.lock().unwrap() = result;
    }

    pub fn calls(&self) -> Vec<Vec<Coordinates>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectionsProvider for FakeDirections {
    async fn find_directions(&self, coordinates: Vec<Coordinates>) -> Result<Directions, Error> {
        self.calls.lock().unwrap().push(coordinates);
        self.result.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct FakeSubmitter {
    failing: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
    submitted: Mutex<Vec<(EditMode, SubmissionPayload)>>,
}

impl FakeSubmitter {
    pub fn fail(&self) {
        *self.failing.lock().unwrap() = true;
    }

    pub fn recover(&self) {
        *self.failing.lock().unwrap() = false;
    }

    /// Holds every submission for `delay` before answering.
    pub fn slow(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn submitted(&self) -> Vec<(EditMode, SubmissionPayload)> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl RouteSubmitter for FakeSubmitter {
    async fn submit_route(
        &self,
        mode: &EditMode,
        payload: &SubmissionPayload,
    ) -> Result<Value, Error> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.failing.lock().unwrap() {
            return Err(upstream_error());
        }

        self.submitted
            .lock()
            .unwrap()
            .push((mode.clone(), payload.clone()));

        Ok(json!({ "id": "r-new" }))
    }
}

pub struct Fakes {
    pub places: Arc<FakePlaces>,
    pub directions: Arc<FakeDirections>,
    pub submitter: Arc<FakeSubmitter>,
    pub location: Arc<ReportedLocation>,
}

pub fn engine() -> (Engine, Fakes) {
    crate::config::init_tracing();

    let fakes = Fakes {
        places: Arc::new(FakePlaces::default()),
        directions: Arc::new(FakeDirections {
            result: Mutex::new(Ok(vec![])),
            calls: Mutex::new(vec![]),
        }),
        submitter: Arc::new(FakeSubmitter::default()),
        location: Arc::new(ReportedLocation::default()),
    };

    let engine = Engine::new(
        fakes.places.clone(),
        fakes.directions.clone(),
        fakes.submitter.clone(),
        fakes.location.clone(),
    );

    (engine, fakes)
}

pub fn ready_draft() -> RouteDraft {
    let mut draft = RouteDraft::new(june_window());
    draft.origin = Some(Place::new("Lyon", Coordinates::new(4.8357, 45.764)));
    draft.destination = Some(Place::new("Dijon", Coordinates::new(5.0415, 47.322)));
    draft
}

pub fn open_ready_session(engine: &Engine) -> uuid::Uuid {
    use crate::api::SessionAPI;

    tokio_test::block_on(engine.open_session(EditMode::Create, ready_draft())).unwrap()
}
