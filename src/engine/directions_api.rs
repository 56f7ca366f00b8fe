use super::Engine;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    api::DirectionsAPI,
    entities::{Directions, RouteCandidate},
    error::Error,
};

#[async_trait]
impl DirectionsAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn calculate_directions(&self, token: Uuid) -> Result<Option<Directions>, Error> {
        let session = self.session(token).await?;

        let ticket = {
            let mut editor = session.lock().await;
            match editor.begin_directions() {
                Some(ticket) => ticket,
                None => {
                    tracing::debug!("some stops are unresolved, not calculating directions");
                    return Ok(None);
                }
            }
        };

        let result = self.directions.find_directions(ticket.key.clone()).await;

        let mut editor = session.lock().await;

        if !editor.apply_directions(&ticket, result) {
            return Ok(None);
        }

        if let Some(err) = editor.take_notice() {
            return Err(err);
        }

        tracing::info!("received {} route alternatives", editor.candidates().len());

        Ok(Some(editor.candidates().to_vec()))
    }

    #[tracing::instrument(skip(self))]
    async fn select_candidate(&self, token: Uuid, index: usize) -> Result<RouteCandidate, Error> {
        let session = self.session(token).await?;
        let mut editor = session.lock().await;

        Ok(editor.select_candidate(index)?.clone())
    }
}

#[test]
fn directions_are_requested_in_travel_order() {
    use super::fakes::{engine, open_ready_session};
    use super::payload::candidate;
    use crate::api::WaypointAPI;
    use crate::entities::{date, Coordinates, Place};
    use tokio_test::block_on;

    let (engine, fakes) = engine();
    let token = open_ready_session(&engine);

    let beaune = Place::new("Beaune", Coordinates::new(4.84, 47.026));
    block_on(engine.add_waypoint(token, beaune, date(2024, 6, 2))).unwrap();

    fakes
        .directions
        .answer(Ok(vec![candidate(&[5000.0, 7000.0])]));

    let directions = block_on(engine.calculate_directions(token))
        .unwrap()
        .unwrap();

    assert_eq!(directions.len(), 1);
    assert_eq!(
        fakes.directions.calls(),
        vec![vec![
            Coordinates::new(4.8357, 45.764),
            Coordinates::new(4.84, 47.026),
            Coordinates::new(5.0415, 47.322),
        ]]
    );
}

#[test]
fn unresolved_stops_hold_back_directions() {
    use super::fakes::{engine, open_ready_session};
    use crate::api::WaypointAPI;
    use crate::entities::date;
    use tokio_test::block_on;

    let (engine, fakes) = engine();
    let token = open_ready_session(&engine);

    block_on(engine.add_pending_waypoint(token, "Beaune".into(), date(2024, 6, 2))).unwrap();

    assert_eq!(block_on(engine.calculate_directions(token)), Ok(None));
    assert!(fakes.directions.calls().is_empty());
}

#[test]
fn provider_failures_keep_previous_directions() {
    use super::fakes::{engine, open_ready_session};
    use super::payload::candidate;
    use crate::error::upstream_error;
    use tokio_test::block_on;

    let (engine, fakes) = engine();
    let token = open_ready_session(&engine);

    fakes.directions.answer(Ok(vec![
        candidate(&[12000.0]),
        candidate(&[13000.0]),
    ]));
    block_on(engine.calculate_directions(token)).unwrap();

    fakes.directions.answer(Err(upstream_error()));
    assert_eq!(
        block_on(engine.calculate_directions(token)),
        Err(upstream_error())
    );

    let selected = block_on(engine.select_candidate(token, 1)).unwrap();
    assert_eq!(selected.distance, 13000.0);
}
