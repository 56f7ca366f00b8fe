use async_trait::async_trait;
use reqwest::{Method, Url};
use serde_json::Value;

use crate::{
    config::Config,
    entities::{EditMode, SubmissionPayload},
    error::{config_error, rejected_error, upstream_error, Error},
    external::RouteSubmitter,
};

/// Client for the backend's route endpoints, the only place a route is persisted.
#[derive(Clone, Debug)]
pub struct RoutesClient {
    client: reqwest::Client,
    api_base: String,
}

impl RoutesClient {
    pub fn new(api_base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.routes_api_base.clone())
    }

    fn request_for(&self, mode: &EditMode) -> Result<(Method, Url), Error> {
        let mut url =
            Url::parse(&self.api_base).map_err(|_| config_error("ROUTES_API_BASE"))?;

        url.path_segments_mut()
            .map_err(|_| config_error("ROUTES_API_BASE"))?
            .pop_if_empty()
            .extend(mode.endpoint());

        match mode.replaces_existing() {
            true => Ok((Method::PUT, url)),
            false => Ok((Method::POST, url)),
        }
    }
}

#[async_trait]
impl RouteSubmitter for RoutesClient {
    #[tracing::instrument(skip(self, payload), fields(mode = %mode.name()))]
    async fn submit_route(
        &self,
        mode: &EditMode,
        payload: &SubmissionPayload,
    ) -> Result<Value, Error> {
        let (method, url) = self.request_for(mode)?;

        let res = self
            .client
            .request(method, url)
            .json(payload)
            .send()
            .await?;

        let status = res.status();

        if status.is_client_error() {
            tracing::warn!("route submission rejected with {}", status);
            return Err(rejected_error());
        } else if !status.is_success() {
            tracing::warn!("route submission failed with {}", status);
            return Err(upstream_error());
        }

        let text = res.text().await?;

        tracing::info!("route submitted");

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
fn request(client: &RoutesClient, mode: &EditMode) -> (Method, String) {
    let (method, url) = client.request_for(mode).unwrap();
    (method, url.to_string())
}

#[test]
fn modes_map_to_methods_and_endpoints() {
    let client = RoutesClient::new("http://localhost:3000/".into());

    assert_eq!(
        request(&client, &EditMode::Create),
        (Method::POST, "http://localhost:3000/api/routes".to_string())
    );
    assert_eq!(
        request(
            &client,
            &EditMode::Clone {
                source_route_id: "r-1".into()
            }
        ),
        (Method::POST, "http://localhost:3000/api/routes".to_string())
    );
    assert_eq!(
        request(
            &client,
            &EditMode::Update {
                route_id: "r-1".into()
            }
        ),
        (Method::PUT, "http://localhost:3000/api/routes/r-1".to_string())
    );
}

#[test]
fn route_ids_are_escaped_into_a_single_segment() {
    let client = RoutesClient::new("http://localhost:3000/backend".into());

    let mode = EditMode::Update {
        route_id: "a/b?c#d".into(),
    };

    assert_eq!(
        request(&client, &mode),
        (
            Method::PUT,
            "http://localhost:3000/backend/api/routes/a%2Fb%3Fc%23d".to_string()
        )
    );
}

#[test]
fn unusable_api_base_is_a_config_error() {
    let client = RoutesClient::new("localhost:3000".into());

    assert_eq!(
        client.request_for(&EditMode::Create).unwrap_err(),
        config_error("ROUTES_API_BASE")
    );
}
