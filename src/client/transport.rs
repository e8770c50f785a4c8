// src/client/transport.rs
use std::future::Future;

use bytes::Bytes;
use futures::{StreamExt, stream::BoxStream};
use tracing::debug;

use crate::{error::ChatError, message::ChatRequest};

/// Path of the chat endpoint on the serving host.
pub const CHAT_PATH: &str = "/chat";

/// Response body as a finite, pull-based sequence of byte chunks.
pub type ByteStream = BoxStream<'static, Result<Bytes, ChatError>>;

/// Status line and body of a chat response. The body has not been read yet.
pub struct ChatReply {
    pub status: u16,
    pub body: ByteStream,
}

impl ChatReply {
    pub fn new(status: u16, body: ByteStream) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl std::fmt::Debug for ChatReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatReply")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Sends one chat request and hands back the unread streaming reply.
///
/// Resolves once response headers are available; a request that never gets
/// that far fails with [`ChatError::Network`].
pub trait ChatTransport: Send + Sync + 'static {
    fn post_message(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ChatReply, ChatError>> + Send;
}

/// [`ChatTransport`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// `endpoint` is the full URL of the chat endpoint, e.g. `http://localhost:3000/chat`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Build the endpoint URL from a base such as `http://localhost:3000`.
    pub fn from_base_url(base_url: &str) -> Self {
        Self::new(format!("{}{}", base_url.trim_end_matches('/'), CHAT_PATH))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ChatTransport for HttpTransport {
    async fn post_message(&self, request: ChatRequest) -> Result<ChatReply, ChatError> {
        // `.json` sets `Content-Type: application/json`.
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        debug!(status, endpoint = %self.endpoint, "chat response headers received");

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| ChatError::Stream(e.to_string())))
            .boxed();

        Ok(ChatReply::new(status, body))
    }
}
