use super::Engine;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::{api::SubmissionAPI, error::Error};

#[async_trait]
impl SubmissionAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn validate_route(&self, token: Uuid) -> Result<(), Error> {
        let session = self.session(token).await?;
        let editor = session.lock().await;

        editor.validate_for_submission()
    }

    #[tracing::instrument(skip(self))]
    async fn submit_route(&self, token: Uuid) -> Result<Value, Error> {
        let session = self.session(token).await?;

        let (mode, payload) = {
            let mut editor = session.lock().await;
            let payload = editor.begin_submission()?;
            (editor.mode().clone(), payload)
        };

        let response = match self.submitter.submit_route(&mode, &payload).await {
            Ok(response) => response,
            Err(err) => {
                session.lock().await.end_submission();
                return Err(err);
            }
        };

        // the backend now owns the route, the editing session is done
        self.sessions.lock().await.remove(&token);

        tracing::info!("submitted route from session {}", token);

        Ok(response)
    }
}

#[test]
fn submitted_payload_carries_cumulative_distances() {
    use super::fakes::{engine, open_ready_session};
    use super::payload::candidate;
    use crate::api::{DirectionsAPI, SessionAPI, WaypointAPI};
    use crate::entities::{date, Coordinates, EditMode, Place};
    use crate::error::unknown_session_error;
    use tokio_test::block_on;

    let (engine, fakes) = engine();
    let token = open_ready_session(&engine);

    let beaune = Place::new("Beaune", Coordinates::new(4.84, 47.026));
    block_on(engine.add_waypoint(token, beaune, date(2024, 6, 2))).unwrap();

    fakes
        .directions
        .answer(Ok(vec![candidate(&[5000.0, 7000.0])]));
    block_on(engine.calculate_directions(token)).unwrap();

    let response = block_on(engine.submit_route(token)).unwrap();
    assert_eq!(response["id"], "r-new");

    let submitted = fakes.submitter.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].0, EditMode::Create);
    assert_eq!(
        submitted[0].1.cumulative_distances(),
        vec![0.0, 5000.0, 12000.0]
    );

    assert_eq!(
        block_on(engine.find_session(token)).unwrap_err(),
        unknown_session_error()
    );
}

#[test]
fn invalid_routes_never_reach_the_backend() {
    use super::fakes::{engine, open_ready_session};
    use super::payload::candidate;
    use crate::api::{DirectionsAPI, WaypointAPI};
    use crate::entities::{date, Coordinates, Place};
    use crate::error::out_of_order_error;
    use tokio_test::block_on;

    let (engine, fakes) = engine();
    let token = open_ready_session(&engine);

    let beaune = Place::new("Beaune", Coordinates::new(4.84, 47.026));
    let chalon = Place::new("Chalon", Coordinates::new(4.85, 46.78));
    block_on(engine.add_waypoint(token, beaune, date(2024, 6, 2))).unwrap();
    block_on(engine.add_waypoint(token, chalon, date(2024, 6, 1))).unwrap();

    fakes
        .directions
        .answer(Ok(vec![candidate(&[5000.0, 3000.0, 7000.0])]));
    block_on(engine.calculate_directions(token)).unwrap();

    assert_eq!(
        block_on(engine.validate_route(token)),
        Err(out_of_order_error("Chalon"))
    );
    assert_eq!(
        block_on(engine.submit_route(token)),
        Err(out_of_order_error("Chalon"))
    );
    assert!(fakes.submitter.submitted().is_empty());
}

#[test]
fn failed_submissions_keep_the_session() {
    use super::fakes::{engine, open_ready_session};
    use super::payload::candidate;
    use crate::api::{DirectionsAPI, SessionAPI};
    use crate::error::upstream_error;
    use tokio_test::block_on;

    let (engine, fakes) = engine();
    let token = open_ready_session(&engine);

    fakes.directions.answer(Ok(vec![candidate(&[12000.0])]));
    block_on(engine.calculate_directions(token)).unwrap();

    fakes.submitter.fail();
    assert_eq!(block_on(engine.submit_route(token)), Err(upstream_error()));

    assert!(block_on(engine.find_session(token)).is_ok());

    fakes.submitter.recover();
    assert!(block_on(engine.submit_route(token)).is_ok());
    assert_eq!(fakes.submitter.submitted().len(), 1);
}

#[tokio::test]
async fn concurrent_submits_post_the_route_once() {
    use super::fakes::{engine, ready_draft};
    use super::payload::candidate;
    use crate::api::{DirectionsAPI, SessionAPI};
    use crate::entities::EditMode;
    use crate::error::submission_in_progress_error;
    use std::time::Duration;

    let (engine, fakes) = engine();
    let token = engine
        .open_session(EditMode::Create, ready_draft())
        .await
        .unwrap();

    fakes.directions.answer(Ok(vec![candidate(&[12000.0])]));
    engine.calculate_directions(token).await.unwrap();

    fakes.submitter.slow(Duration::from_millis(20));
    let (first, second) = tokio::join!(engine.submit_route(token), engine.submit_route(token));

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.contains(&Err(submission_in_progress_error())));
    assert_eq!(fakes.submitter.submitted().len(), 1);
}
