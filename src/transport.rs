//! Transport boundary
//!
//! [`Transport`] is the seam between the pipeline and the network: given a
//! wire request it returns either a decoded response or the raw payload
//! stream of a streaming call. [`HttpTransport`] is the reqwest-backed
//! implementation for chat-completions endpoints.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::header;

use crate::error::{BridgeError, Result};
use crate::wire::{WireRequest, WireResponse};

/// Raw payload byte stream of one streaming call
pub type PayloadStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Sends wire requests and opens payload streams
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and decode the complete response body
    async fn send(&self, request: &WireRequest) -> Result<WireResponse>;

    /// Send a request and return the raw event payload stream
    async fn open_stream(&self, request: &WireRequest) -> Result<PayloadStream>;
}

/// Connection settings for [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: String,
    pub api_key: String,
    /// Whole-request timeout; applies to non-streaming calls and to the
    /// initial response of streaming calls
    pub timeout: Option<Duration>,
}

impl TransportConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Some(Duration::from_secs(300)),
        }
    }
}

/// HTTP transport for chat-completions endpoints
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport with bearer authentication.
    ///
    /// # Errors
    ///
    /// Fails when the API key is not a valid header value or the client
    /// cannot be constructed.
    pub fn new(config: TransportConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let auth = header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| BridgeError::InvalidConfig("invalid API key format".into()))?;
        headers.insert(header::AUTHORIZATION, auth);

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn dispatch(&self, request: &WireRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.endpoint())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "request rejected by provider");
            return Err(BridgeError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &WireRequest) -> Result<WireResponse> {
        let response = self.dispatch(request).await?;
        Ok(response.json().await?)
    }

    async fn open_stream(&self, request: &WireRequest) -> Result<PayloadStream> {
        let response = self.dispatch(request).await?;
        Ok(Box::pin(response.bytes_stream().map_err(BridgeError::Http)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelDescriptor;
    use crate::request::{build_request, GenerationOptions};
    use crate::wire::{WireMessage, WireRole};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_request(stream: bool) -> WireRequest {
        let model = ModelDescriptor::general("gpt-test", 128_000, 16_384);
        build_request(
            &model,
            vec![WireMessage::new(WireRole::User, "2+2?")],
            &GenerationOptions::default(),
            None,
            None,
            stream,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn send_decodes_a_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({"model": "gpt-test", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "r1",
                "model": "gpt-test",
                "choices": [{"index": 0, "message": {"content": "4"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4},
            })))
            .mount(&server)
            .await;

        let transport =
            HttpTransport::new(TransportConfig::new(server.uri(), "test-key")).unwrap();
        let response = transport.send(&sample_request(false)).await.unwrap();

        assert_eq!(response.choices[0].message.content.as_deref(), Some("4"));
        assert_eq!(response.usage.unwrap().total_tokens, 4);
    }

    #[tokio::test]
    async fn non_success_status_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(TransportConfig::new(server.uri(), "k")).unwrap();
        let err = transport.send(&sample_request(false)).await.unwrap_err();
        match err {
            BridgeError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "rate limited");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn open_stream_yields_raw_payloads() {
        let server = MockServer::start().await;
        let body = "data: {\"id\":\"c1\",\"choices\":[]}\n\ndata: [DONE]\n\n";
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(TransportConfig::new(server.uri(), "k")).unwrap();
        let payloads = transport.open_stream(&sample_request(true)).await.unwrap();
        let collected: Vec<Bytes> = payloads.try_collect().await.unwrap();
        let joined: Vec<u8> = collected.concat();
        assert_eq!(String::from_utf8(joined).unwrap(), body);
    }

    #[test]
    fn invalid_api_key_is_a_config_error() {
        let err = HttpTransport::new(TransportConfig::new("http://x", "bad\nkey")).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidConfig(_)));
    }
}
