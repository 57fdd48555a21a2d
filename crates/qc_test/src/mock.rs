use std::time::Duration;

use httpmock::{Method::POST, Mock, MockServer};
use serde_json::{Value, json};

/// A local HTTP server serving canned event-stream responses for the chat
/// endpoint.
pub struct SseServer {
    server: MockServer,
}

impl SseServer {
    /// Start a new server on a random local port.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start_async().await,
        }
    }

    /// The base URL to point a client at.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.server.base_url()
    }

    /// Answer every chat request for `bot` with `body` as an event stream.
    pub async fn stream(&self, bot: &str, body: impl Into<String>) -> Mock<'_> {
        self.stream_delayed(bot, body, Duration::ZERO).await
    }

    /// Like [`SseServer::stream`], but wait `delay` before responding.
    pub async fn stream_delayed(
        &self,
        bot: &str,
        body: impl Into<String>,
        delay: Duration,
    ) -> Mock<'_> {
        let path = format!("/chat/{bot}");
        let body = body.into();

        self.server
            .mock_async(|when, then| {
                when.method(POST).path(path);
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .delay(delay)
                    .body(body);
            })
            .await
    }

    /// Answer chat requests for `bot` whose JSON body equals `request`.
    pub async fn stream_for_request(
        &self,
        bot: &str,
        request: Value,
        body: impl Into<String>,
    ) -> Mock<'_> {
        let path = format!("/chat/{bot}");
        let body = body.into();

        self.server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(path)
                    .header("content-type", "application/json")
                    .json_body(request);
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .body(body);
            })
            .await
    }

    /// Answer every chat request for `bot` with a complete JSON answer
    /// instead of an event stream.
    pub async fn complete(&self, bot: &str, answer: Value) -> Mock<'_> {
        let path = format!("/chat/{bot}");
        let body = answer.to_string();

        self.server
            .mock_async(|when, then| {
                when.method(POST).path(path);
                then.status(200)
                    .header("content-type", "application/json")
                    .body(body);
            })
            .await
    }

    /// Answer every chat request for `bot` with a plain error response.
    pub async fn fail(&self, bot: &str, status: u16, body: &str) -> Mock<'_> {
        let path = format!("/chat/{bot}");
        let body = body.to_owned();

        self.server
            .mock_async(|when, then| {
                when.method(POST).path(path);
                then.status(status).body(body);
            })
            .await
    }
}

/// Builder for event-stream response bodies in the backend's frame format.
#[derive(Debug, Default, Clone)]
pub struct SseBody(String);

impl SseBody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A text fragment of the answer.
    #[must_use]
    pub fn chunk(self, text: &str) -> Self {
        self.frame(&json!({ "chunk": text }))
    }

    /// A source list on its own.
    #[must_use]
    pub fn sources(self, sources: Value) -> Self {
        self.frame(&json!({ "sources": sources }))
    }

    /// The final frame, carrying the sources of the answer.
    #[must_use]
    pub fn done_with_sources(self, sources: Value) -> Self {
        self.frame(&json!({ "done": true, "sources": sources }))
    }

    #[must_use]
    pub fn done(self) -> Self {
        self.frame(&json!({ "done": true }))
    }

    #[must_use]
    pub fn error(self, message: &str) -> Self {
        self.frame(&json!({ "error": message }))
    }

    #[must_use]
    pub fn frame(self, payload: &Value) -> Self {
        self.raw(&format!("data: {payload}\n\n"))
    }

    /// Append `text` to the body as-is.
    #[must_use]
    pub fn raw(mut self, text: &str) -> Self {
        self.0.push_str(text);
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.0
    }
}

impl From<SseBody> for String {
    fn from(body: SseBody) -> Self {
        body.0
    }
}
