use super::Engine;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    api::WaypointAPI,
    entities::{Place, Waypoint},
    error::Error,
};

#[async_trait]
impl WaypointAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn add_waypoint(
        &self,
        token: Uuid,
        place: Place,
        scheduled_arrival: NaiveDate,
    ) -> Result<Vec<Waypoint>, Error> {
        let session = self.session(token).await?;
        let mut editor = session.lock().await;

        Ok(editor.add_waypoint(place, scheduled_arrival)?.to_vec())
    }

    #[tracing::instrument(skip(self))]
    async fn add_pending_waypoint(
        &self,
        token: Uuid,
        name: String,
        scheduled_arrival: NaiveDate,
    ) -> Result<Vec<Waypoint>, Error> {
        let session = self.session(token).await?;
        let mut editor = session.lock().await;

        Ok(editor.add_pending_waypoint(name, scheduled_arrival)?.to_vec())
    }

    #[tracing::instrument(skip(self))]
    async fn resolve_waypoint(
        &self,
        token: Uuid,
        id: Uuid,
        place: Place,
    ) -> Result<Vec<Waypoint>, Error> {
        let session = self.session(token).await?;
        let mut editor = session.lock().await;

        Ok(editor.resolve_waypoint(id, place)?.to_vec())
    }

    #[tracing::instrument(skip(self))]
    async fn remove_waypoint(&self, token: Uuid, id: Uuid) -> Result<Vec<Waypoint>, Error> {
        let session = self.session(token).await?;
        let mut editor = session.lock().await;

        Ok(editor.remove_waypoint(id).to_vec())
    }

    #[tracing::instrument(skip(self))]
    async fn update_waypoint_date(
        &self,
        token: Uuid,
        id: Uuid,
        new_date: NaiveDate,
    ) -> Result<Vec<Waypoint>, Error> {
        let session = self.session(token).await?;
        let mut editor = session.lock().await;

        editor.update_waypoint_date(id, new_date)?;

        Ok(editor.waypoints().to_vec())
    }
}

#[test]
fn removing_an_unknown_waypoint_leaves_the_list_alone() {
    use super::fakes::{engine, open_ready_session};
    use crate::entities::{date, Coordinates};
    use tokio_test::block_on;

    let (engine, _) = engine();
    let token = open_ready_session(&engine);

    let beaune = Place::new("Beaune", Coordinates::new(4.84, 47.026));
    let before = block_on(engine.add_waypoint(token, beaune, date(2024, 6, 2))).unwrap();

    let after = block_on(engine.remove_waypoint(token, Uuid::new_v4())).unwrap();

    assert_eq!(before, after);
}

#[test]
fn waypoint_errors_come_back_as_validation_errors() {
    use super::fakes::{engine, open_ready_session};
    use crate::entities::date;
    use crate::error::outside_window_error;
    use tokio_test::block_on;

    let (engine, _) = engine();
    let token = open_ready_session(&engine);

    let waypoints =
        block_on(engine.add_pending_waypoint(token, "Beaune".into(), date(2024, 6, 2))).unwrap();
    let id = waypoints[0].id;

    let err = block_on(engine.update_waypoint_date(token, id, date(2024, 7, 1))).unwrap_err();

    assert_eq!(err, outside_window_error("Beaune"));
    assert!(err.is_validation());
}

#[test]
fn stops_with_nan_coordinates_never_enter_the_list() {
    use super::fakes::{engine, open_ready_session};
    use crate::entities::{date, Coordinates};
    use crate::error::invalid_coordinates_error;
    use tokio_test::block_on;

    let (engine, _) = engine();
    let token = open_ready_session(&engine);

    let bad = Place::new("Bad", Coordinates::new(f64::NAN, 47.0));
    let err = block_on(engine.add_waypoint(token, bad.clone(), date(2024, 6, 2))).unwrap_err();
    assert_eq!(err, invalid_coordinates_error("Bad"));
    assert!(err.is_validation());

    let waypoints =
        block_on(engine.add_pending_waypoint(token, "Beaune".into(), date(2024, 6, 2))).unwrap();
    let id = waypoints[0].id;

    let err = block_on(engine.resolve_waypoint(token, id, bad)).unwrap_err();
    assert_eq!(err, invalid_coordinates_error("Bad"));

    let waypoints = block_on(engine.remove_waypoint(token, Uuid::new_v4())).unwrap();
    assert_eq!(waypoints.len(), 1);
    assert_eq!(waypoints[0].coordinates, None);
}
