//! Blocking Hasura transport over HTTP.

use moped_core::{FetchError, GraphqlRequest, Transport};
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpTransport {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
        }
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &GraphqlRequest) -> Result<Value, FetchError> {
        let mut call = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .set("User-Agent", "moped-cli");

        if let Some(auth) = request.authorization() {
            call = call.set("Authorization", &auth);
        }

        tracing::debug!(endpoint = %self.endpoint, authorized = request.bearer_token.is_some(), "POST graphql");

        match call.send_json(request) {
            Ok(response) => response
                .into_json::<Value>()
                .map_err(|err| FetchError::Decode(err.to_string())),
            // Hasura reports most failures as 200 + `errors`; a non-2xx body may
            // still carry them, so hand it to the decoder when it parses.
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                match serde_json::from_str::<Value>(&body) {
                    Ok(json) if json.get("errors").is_some() => Ok(json),
                    _ => Err(FetchError::Transport(format!("HTTP {code}: {body}"))),
                }
            }
            Err(err) => Err(FetchError::Transport(err.to_string())),
        }
    }
}
