//! `HttpRequestNode` — makes one outbound HTTP call and captures the response.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::Context;
use crate::status::{NodeStatus, StatusSink};
use crate::step::{thunk, StepRunner};
use crate::traits::ExecutableNode;
use crate::NodeError;

/// The default per-request timeout when none is configured (spec: "a
/// transport-appropriate default, e.g. 30s").
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    fn is_body_bearing(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl From<HttpMethod> for Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

fn default_method() -> Value {
    json!("GET")
}

#[derive(Debug, Deserialize)]
struct HttpRequestConfig {
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default = "default_method")]
    method: Value,
    #[serde(default)]
    body: Option<String>,
}

/// Executor for the `HTTP_REQUEST` node type. One [`HttpRequestNode`]
/// instance can safely be shared across concurrent executions; it owns a
/// single pooled `reqwest::Client`.
pub struct HttpRequestNode {
    client: reqwest::Client,
}

impl HttpRequestNode {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client configuration is valid");
        Self { client }
    }
}

impl Default for HttpRequestNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutableNode for HttpRequestNode {
    async fn execute(
        &self,
        data: &Value,
        node_id: &str,
        context: Context,
        step: &dyn StepRunner,
        status: &dyn StatusSink,
    ) -> Result<Context, NodeError> {
        status.emit(node_id, NodeStatus::Loading).await;

        let result = self.execute_inner(data, node_id, context, step).await;

        status
            .emit(node_id, if result.is_ok() { NodeStatus::Success } else { NodeStatus::Error })
            .await;
        result
    }
}

impl HttpRequestNode {
    async fn execute_inner(
        &self,
        data: &Value,
        node_id: &str,
        context: Context,
        step: &dyn StepRunner,
    ) -> Result<Context, NodeError> {
        let config: HttpRequestConfig = serde_json::from_value(data.clone()).map_err(|e| {
            NodeError::Fatal(format!("HTTP Request node: invalid configuration: {e}"))
        })?;

        let endpoint = match &config.endpoint {
            Some(e) if !e.trim().is_empty() => e.clone(),
            _ => return Err(NodeError::Fatal("HTTP Request node: No endpoint configured".into())),
        };

        let method: HttpMethod = serde_json::from_value(config.method).map_err(|_| {
            NodeError::Fatal("HTTP Request node: unknown HTTP method configured".into())
        })?;

        let client = self.client.clone();
        let body = config.body.clone();
        let name = format!("http-request:{node_id}");

        let response_value = step
            .run(
                &name,
                thunk(move || async move {
                    let mut request = client.request(method.into(), &endpoint);
                    if method.is_body_bearing() {
                        if let Some(body) = body {
                            request = request.body(body);
                        }
                    }

                    let response = request.send().await.map_err(|e| {
                        NodeError::Retryable(format!("HTTP Request node: request failed: {e}"))
                    })?;

                    let status = response.status();
                    let status_code = status.as_u16();
                    let status_text = status.canonical_reason().unwrap_or("").to_string();

                    let content_type = response
                        .headers()
                        .get(reqwest::header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();

                    let is_json = content_type.contains("application/json");

                    let body_text = response.text().await.map_err(|e| {
                        NodeError::Retryable(format!(
                            "HTTP Request node: failed to read response body: {e}"
                        ))
                    })?;

                    let data_value = if is_json {
                        serde_json::from_str::<Value>(&body_text).unwrap_or(Value::String(body_text))
                    } else {
                        Value::String(body_text)
                    };

                    let http_response = json!({
                        "status": status_code,
                        "statusText": status_text,
                        "data": data_value,
                    });

                    if status_code >= 400 {
                        return Err(NodeError::Retryable(format!(
                            "HTTP Request node: received status {status_code} {status_text}"
                        )));
                    }

                    Ok(http_response)
                }),
            )
            .await?;

        Ok(context.with("httpResponse", response_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{InMemoryStepRunner, RecordingStatusSink};
    use crate::status::NoopStatusSink;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn missing_endpoint_is_fatal() {
        let node = HttpRequestNode::new();
        let step = InMemoryStepRunner::new();

        let err = node
            .execute(&json!({}), "n1", Context::new(), &step, &NoopStatusSink)
            .await
            .unwrap_err();

        assert!(matches!(err, NodeError::Fatal(_)));
        assert!(err.to_string().contains("No endpoint configured"));
    }

    #[tokio::test]
    async fn empty_endpoint_is_fatal() {
        let node = HttpRequestNode::new();
        let step = InMemoryStepRunner::new();

        let err = node
            .execute(&json!({"endpoint": ""}), "n1", Context::new(), &step, &NoopStatusSink)
            .await
            .unwrap_err();

        assert!(matches!(err, NodeError::Fatal(_)));
    }

    #[tokio::test]
    async fn unknown_method_is_fatal() {
        let node = HttpRequestNode::new();
        let step = InMemoryStepRunner::new();

        let err = node
            .execute(
                &json!({"endpoint": "http://example.test", "method": "TRACE"}),
                "n1",
                Context::new(),
                &step,
                &NoopStatusSink,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, NodeError::Fatal(_)));
    }

    #[tokio::test]
    async fn missing_endpoint_still_emits_loading_then_error() {
        let node = HttpRequestNode::new();
        let step = InMemoryStepRunner::new();
        let sink = RecordingStatusSink::new();

        node.execute(&json!({}), "n1", Context::new(), &step, &sink)
            .await
            .unwrap_err();

        assert_eq!(sink.transitions("n1"), vec![NodeStatus::Loading, NodeStatus::Error]);
    }

    #[tokio::test]
    async fn json_response_is_decoded_into_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "application/json")
                    .set_body_string(r#"{"x":42}"#),
            )
            .mount(&server)
            .await;

        let node = HttpRequestNode::new();
        let step = InMemoryStepRunner::new();

        let out = node
            .execute(
                &json!({"endpoint": format!("{}/a", server.uri()), "method": "GET"}),
                "n2",
                Context::new(),
                &step,
                &NoopStatusSink,
            )
            .await
            .unwrap();

        let resp = out.get("httpResponse").unwrap();
        assert_eq!(resp["status"], 200);
        assert_eq!(resp["statusText"], "OK");
        assert_eq!(resp["data"], json!({"x": 42}));
    }

    #[tokio::test]
    async fn non_json_response_is_kept_as_string() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/plain")
                    .set_body_string("hello"),
            )
            .mount(&server)
            .await;

        let node = HttpRequestNode::new();
        let step = InMemoryStepRunner::new();

        let out = node
            .execute(
                &json!({"endpoint": format!("{}/a", server.uri())}),
                "n2",
                Context::new(),
                &step,
                &NoopStatusSink,
            )
            .await
            .unwrap();

        assert_eq!(out.get("httpResponse").unwrap()["data"], json!("hello"));
    }

    #[tokio::test]
    async fn server_error_status_is_retriable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let node = HttpRequestNode::new();
        let step = InMemoryStepRunner::new();

        let err = node
            .execute(
                &json!({"endpoint": format!("{}/a", server.uri())}),
                "n2",
                Context::new(),
                &step,
                &NoopStatusSink,
            )
            .await
            .unwrap_err();

        assert!(err.is_retriable());
    }

    #[tokio::test]
    async fn post_forwards_body_get_ignores_it() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let node = HttpRequestNode::new();
        let step = InMemoryStepRunner::new();

        let out = node
            .execute(
                &json!({
                    "endpoint": format!("{}/a", server.uri()),
                    "method": "POST",
                    "body": "payload",
                }),
                "n3",
                Context::new(),
                &step,
                &NoopStatusSink,
            )
            .await
            .unwrap();

        assert_eq!(out.get("httpResponse").unwrap()["data"], json!("ok"));
    }
}
