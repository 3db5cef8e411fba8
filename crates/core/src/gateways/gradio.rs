use crate::traits::InferenceGateway;
use crate::{InferenceError, InferenceRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

const BACKEND: &str = "gradio";

pub const DEFAULT_ENDPOINT: &str = "https://mr-ez0-test-gradio.hf.space";

#[derive(Debug, Clone)]
pub struct GradioConfig {
    pub endpoint: String,
    pub token: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for GradioConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            timeout: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallQueued {
    event_id: String,
}

/// Calls a hosted Gradio chat app through its two-step HTTP call API.
pub struct GradioGateway {
    client: Client,
    endpoint: Url,
    token: Option<String>,
}

impl GradioGateway {
    pub fn new(config: GradioConfig) -> Result<Self, InferenceError> {
        let endpoint = Url::parse(config.endpoint.trim_end_matches('/'))?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
            token: config.token,
        })
    }

    fn call_url(&self, api_name: &str) -> String {
        format!(
            "{}/gradio_api/call/{}",
            self.endpoint.as_str().trim_end_matches('/'),
            api_name.trim_start_matches('/')
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl InferenceGateway for GradioGateway {
    async fn predict(&self, request: &InferenceRequest) -> Result<String, InferenceError> {
        let call_url = self.call_url(&request.params.api_name);

        let response = self
            .authorize(self.client.post(&call_url))
            .json(&call_payload(request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InferenceError::BackendResponse {
                backend: BACKEND.to_string(),
                details: format!("call to {call_url} returned {}", response.status()),
            });
        }

        let queued: CallQueued = response.json().await?;
        debug!(event_id = %queued.event_id, "inference call queued");

        let response = self
            .authorize(self.client.get(format!("{call_url}/{}", queued.event_id)))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InferenceError::BackendResponse {
                backend: BACKEND.to_string(),
                details: format!("result stream for {} returned {}", queued.event_id, response.status()),
            });
        }

        let body = response.text().await?;
        parse_event_stream(&body)
    }
}

fn call_payload(request: &InferenceRequest) -> Value {
    json!({
        "data": [
            request.prompt.message,
            request.prompt.system_message,
            request.params.max_tokens,
            request.params.temperature,
            request.params.top_p,
        ]
    })
}

/// Picks the answer out of the server-sent events of a finished call.
fn parse_event_stream(body: &str) -> Result<String, InferenceError> {
    let mut event = "";

    for line in body.lines() {
        if let Some(name) = line.strip_prefix("event:") {
            event = name.trim();
            continue;
        }

        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();

        match event {
            "complete" => {
                let value: Value = serde_json::from_str(data)?;
                return answer_from_output(value);
            }
            "error" => {
                return Err(InferenceError::Request(if data.is_empty() || data == "null" {
                    "inference service reported an error".to_string()
                } else {
                    data.to_string()
                }));
            }
            _ => {}
        }
    }

    Err(InferenceError::BackendResponse {
        backend: BACKEND.to_string(),
        details: "event stream ended without a complete event".to_string(),
    })
}

fn answer_from_output(value: Value) -> Result<String, InferenceError> {
    let first = match value {
        Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        other => {
            return Err(InferenceError::BackendResponse {
                backend: BACKEND.to_string(),
                details: format!("unexpected output payload: {other}"),
            })
        }
    };

    Ok(match first {
        Value::String(text) => text,
        other => other.to_string(),
    })
}
