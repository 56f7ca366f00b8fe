use super::Engine;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{api::LookupAPI, entities::PlaceSuggestion, error::Error};

#[async_trait]
impl LookupAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn suggest_places(
        &self,
        token: Uuid,
        query: String,
    ) -> Result<Option<Vec<PlaceSuggestion>>, Error> {
        let session = self.session(token).await?;

        let ticket = {
            let mut editor = session.lock().await;
            match editor.begin_lookup(&query) {
                Some(ticket) => ticket,
                None => return Ok(None),
            }
        };

        if !self.lookup_debounce.is_zero() {
            tokio::time::sleep(self.lookup_debounce).await;

            if !session.lock().await.is_lookup_current(&ticket) {
                tracing::debug!("query superseded while debouncing");
                return Ok(None);
            }
        }

        let proximity = self.location.current_location();
        let result = self.places.find_places(ticket.key.clone(), proximity).await;

        let mut editor = session.lock().await;

        if !editor.apply_lookup(&ticket, result) {
            return Ok(None);
        }

        if let Some(err) = editor.take_notice() {
            return Err(err);
        }

        Ok(Some(editor.suggestions().to_vec()))
    }

    #[tracing::instrument(skip(self))]
    async fn find_suggestions(&self, token: Uuid) -> Result<Vec<PlaceSuggestion>, Error> {
        let session = self.session(token).await?;
        let editor = session.lock().await;

        Ok(editor.suggestions().to_vec())
    }
}

#[tokio::test]
async fn slow_response_for_an_older_query_is_discarded() {
    use super::fakes::{engine, ready_draft};
    use crate::api::SessionAPI;
    use crate::entities::EditMode;
    use std::sync::Arc;

    let (engine, fakes) = engine();
    let engine = Arc::new(engine);
    let token = engine
        .open_session(EditMode::Create, ready_draft())
        .await
        .unwrap();

    let release_a = fakes.places.gate("Be");
    let release_b = fakes.places.gate("Beaune");

    let a = tokio::spawn({
        let engine = engine.clone();
        async move { engine.suggest_places(token, "Be".into()).await }
    });
    fakes.places.wait_for_calls(1).await;

    let b = tokio::spawn({
        let engine = engine.clone();
        async move { engine.suggest_places(token, "Beaune".into()).await }
    });
    fakes.places.wait_for_calls(2).await;

    release_b.send(()).unwrap();
    let applied = b.await.unwrap().unwrap().unwrap();
    assert_eq!(applied[0].label, "Beaune (result)");

    release_a.send(()).unwrap();
    assert_eq!(a.await.unwrap(), Ok(None));

    let shown = engine.find_suggestions(token).await.unwrap();
    let labels: Vec<&str> = shown.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Beaune (result)"]);
}

#[tokio::test]
async fn debounce_skips_queries_typed_over() {
    use super::fakes::{engine, ready_draft};
    use crate::api::SessionAPI;
    use crate::entities::EditMode;
    use std::time::Duration;

    let (engine, fakes) = engine();
    let engine = engine.lookup_debounce(Duration::from_millis(20));
    let token = engine
        .open_session(EditMode::Create, ready_draft())
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        engine.suggest_places(token, "Bea".into()),
        engine.suggest_places(token, "Beau".into())
    );

    assert_eq!(first, Ok(None));
    assert_eq!(second.unwrap().unwrap().len(), 1);
    assert_eq!(fakes.places.queries(), vec!["Beau".to_string()]);
}

#[tokio::test]
async fn lookups_are_biased_towards_the_user() {
    use super::fakes::{engine, ready_draft};
    use crate::api::SessionAPI;
    use crate::entities::{Coordinates, EditMode};

    let (engine, fakes) = engine();
    let token = engine
        .open_session(EditMode::Create, ready_draft())
        .await
        .unwrap();

    fakes.location.report(Coordinates::new(4.83, 45.76));
    engine.suggest_places(token, "Beaune".into()).await.unwrap();

    assert_eq!(
        fakes.places.proximities(),
        vec![Some(Coordinates::new(4.83, 45.76))]
    );
}

#[tokio::test]
async fn failed_lookups_surface_once_and_leave_no_suggestions() {
    use super::fakes::{engine, ready_draft};
    use crate::api::SessionAPI;
    use crate::entities::EditMode;
    use crate::error::upstream_error;

    let (engine, _) = engine();
    let token = engine
        .open_session(EditMode::Create, ready_draft())
        .await
        .unwrap();

    engine.suggest_places(token, "Lyon".into()).await.unwrap();
    let err = engine
        .suggest_places(token, "fail here".into())
        .await
        .unwrap_err();

    assert_eq!(err, upstream_error());
    assert!(err.is_provider());
    assert!(engine.find_suggestions(token).await.unwrap().is_empty());

    // too short to search
    assert_eq!(engine.suggest_places(token, "L".into()).await, Ok(None));
}
