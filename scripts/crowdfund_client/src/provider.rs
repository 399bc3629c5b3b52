use linera_base::identifiers::ApplicationId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// Failures the client reports to the user.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
    #[error("no wallet owner configured; write operations are unavailable")]
    WalletUnavailable,
    #[error("GraphQL error: {0}")]
    GraphQl(String),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Reads and writes application state.
pub trait Provider {
    /// Runs one GraphQL document against `application` and returns its `data`.
    async fn execute(
        &self,
        application: &ApplicationId,
        query: &str,
        variables: Value,
    ) -> Result<Value, ClientError>;
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl GraphQlResponse {
    /// Rejected operations surface as errors, never as empty data.
    pub fn into_data(self) -> Result<Value, ClientError> {
        if !self.errors.is_empty() {
            let messages: Vec<String> = self.errors.into_iter().map(|error| error.message).collect();
            return Err(ClientError::GraphQl(messages.join("; ")));
        }
        self.data
            .ok_or_else(|| ClientError::UnexpectedResponse("response carries no data".to_string()))
    }
}

/// GraphQL over HTTP against `linera service`. Mutations are signed by the
/// node service's wallet.
pub struct NodeServiceProvider {
    config: Config,
    http: reqwest::Client,
}

impl NodeServiceProvider {
    pub fn new(config: Config) -> Self {
        NodeServiceProvider {
            config,
            http: reqwest::Client::new(),
        }
    }
}

impl Provider for NodeServiceProvider {
    async fn execute(
        &self,
        application: &ApplicationId,
        query: &str,
        variables: Value,
    ) -> Result<Value, ClientError> {
        let url = self.config.application_url(application);
        debug!(%url, query, "GraphQL request");
        let response: GraphQlResponse = self
            .http
            .post(&url)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response.into_data()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn data_is_returned_without_errors() {
        let response: GraphQlResponse =
            serde_json::from_value(json!({ "data": { "fundraisersCount": 3 } })).unwrap();

        assert_eq!(response.into_data().unwrap(), json!({ "fundraisersCount": 3 }));
    }

    #[test]
    fn errors_win_over_data() {
        let response: GraphQlResponse = serde_json::from_value(json!({
            "data": null,
            "errors": [{ "message": "offset out of bounds", "locations": [] }]
        }))
        .unwrap();

        let error = response.into_data().unwrap_err();
        assert!(matches!(&error, ClientError::GraphQl(message) if message == "offset out of bounds"));
    }

    #[test]
    fn missing_data_is_unexpected() {
        let response: GraphQlResponse = serde_json::from_value(json!({})).unwrap();

        assert!(matches!(response.into_data(), Err(ClientError::UnexpectedResponse(_))));
    }
}
