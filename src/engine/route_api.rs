use super::Engine;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    api::RouteAPI,
    entities::{Place, RouteWindow, TripAttributes},
    error::Error,
};

#[async_trait]
impl RouteAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn set_origin(&self, token: Uuid, place: Place) -> Result<(), Error> {
        let session = self.session(token).await?;
        session.lock().await.set_origin(place)?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn set_destination(&self, token: Uuid, place: Place) -> Result<(), Error> {
        let session = self.session(token).await?;
        session.lock().await.set_destination(place)?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn change_window(&self, token: Uuid, window: RouteWindow) -> Result<usize, Error> {
        let session = self.session(token).await?;
        let shifted = session.lock().await.change_window(window);

        tracing::debug!("{} stops followed the new departure date", shifted);

        Ok(shifted)
    }

    #[tracing::instrument(skip(self))]
    async fn set_attributes(&self, token: Uuid, attributes: TripAttributes) -> Result<(), Error> {
        let session = self.session(token).await?;
        session.lock().await.set_attributes(attributes);

        Ok(())
    }
}

#[test]
fn window_changes_carry_default_stops_along() {
    use super::fakes::{engine, open_ready_session};
    use crate::api::{SessionAPI, WaypointAPI};
    use crate::entities::{date, june_window, Coordinates};
    use tokio_test::block_on;

    let (engine, _) = engine();
    let token = open_ready_session(&engine);

    let beaune = Place::new("Beaune", Coordinates::new(4.84, 47.026));
    block_on(engine.add_waypoint(token, beaune.clone(), date(2024, 6, 1))).unwrap();
    block_on(engine.add_waypoint(token, beaune, date(2024, 6, 3))).unwrap();

    let mut window = june_window();
    window.departure_date = date(2024, 5, 30);

    assert_eq!(block_on(engine.change_window(token, window)), Ok(1));

    let draft = block_on(engine.find_session(token)).unwrap();
    assert_eq!(draft.waypoints[0].scheduled_arrival, date(2024, 5, 30));
    assert_eq!(draft.waypoints[1].scheduled_arrival, date(2024, 6, 3));
}

#[test]
fn mislocated_origin_is_rejected_before_directions() {
    use super::fakes::{engine, open_ready_session};
    use crate::api::{DirectionsAPI, SessionAPI};
    use crate::entities::Coordinates;
    use crate::error::invalid_coordinates_error;
    use tokio_test::block_on;

    let (engine, fakes) = engine();
    let token = open_ready_session(&engine);

    let nowhere = Place::new("Nowhere", Coordinates::new(f64::NAN, f64::NAN));
    let err = block_on(engine.set_origin(token, nowhere)).unwrap_err();
    assert_eq!(err, invalid_coordinates_error("origin"));
    assert!(err.is_validation());

    let draft = block_on(engine.find_session(token)).unwrap();
    assert_eq!(draft.origin.map(|p| p.name), Some("Lyon".to_string()));

    block_on(engine.calculate_directions(token)).unwrap();
    assert!(fakes
        .directions
        .calls()
        .iter()
        .flatten()
        .all(Coordinates::is_valid));
}
