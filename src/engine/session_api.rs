use super::{Engine, RouteEditor};

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    api::SessionAPI,
    entities::{EditMode, RouteDraft},
    error::{unknown_session_error, Error},
};

#[async_trait]
impl SessionAPI for Engine {
    #[tracing::instrument(skip(self, draft), fields(mode = %mode.name()))]
    async fn open_session(&self, mode: EditMode, draft: RouteDraft) -> Result<Uuid, Error> {
        let token = Uuid::new_v4();
        let editor = RouteEditor::new(mode, draft, self.max_waypoints);

        self.sessions
            .lock()
            .await
            .insert(token, Arc::new(Mutex::new(editor)));

        tracing::info!("opened editing session {}", token);

        Ok(token)
    }

    #[tracing::instrument(skip(self))]
    async fn find_session(&self, token: Uuid) -> Result<RouteDraft, Error> {
        let session = self.session(token).await?;
        let editor = session.lock().await;

        Ok(editor.draft())
    }

    #[tracing::instrument(skip(self))]
    async fn close_session(&self, token: Uuid) -> Result<(), Error> {
        self.sessions
            .lock()
            .await
            .remove(&token)
            .map(|_| ())
            .ok_or_else(|| unknown_session_error())
    }
}

#[test]
fn sessions_open_and_close() {
    use super::fakes::engine;
    use crate::entities::june_window;
    use tokio_test::block_on;

    let (engine, _) = engine();

    let token = block_on(engine.open_session(EditMode::Create, RouteDraft::new(june_window())))
        .unwrap();

    let draft = block_on(engine.find_session(token)).unwrap();
    assert_eq!(draft.window, june_window());

    block_on(engine.close_session(token)).unwrap();

    assert_eq!(
        block_on(engine.find_session(token)).unwrap_err(),
        unknown_session_error()
    );
    assert!(block_on(engine.close_session(token)).is_err());
}

#[test]
fn stop_limit_cannot_be_raised_past_the_maximum() {
    use super::fakes::{engine, open_ready_session};
    use super::MAX_WAYPOINTS;
    use crate::api::WaypointAPI;
    use crate::entities::{date, Coordinates, Place};
    use crate::error::too_many_stops_error;
    use tokio_test::block_on;

    let (engine, _) = engine();
    let engine = engine.max_waypoints(100);
    let token = open_ready_session(&engine);

    let beaune = Place::new("Beaune", Coordinates::new(4.84, 47.026));
    for _ in 0..MAX_WAYPOINTS {
        block_on(engine.add_waypoint(token, beaune.clone(), date(2024, 6, 2))).unwrap();
    }

    assert_eq!(
        block_on(engine.add_waypoint(token, beaune, date(2024, 6, 2))).unwrap_err(),
        too_many_stops_error(MAX_WAYPOINTS)
    );
}
