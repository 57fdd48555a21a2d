use std::{io, pin::Pin, time::Duration};

use async_stream::stream;
use futures::{Stream, StreamExt as _, TryStreamExt as _};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use tokio::time::timeout;
use tokio_util::{
    codec::{FramedRead, LinesCodec},
    io::StreamReader,
    sync::CancellationToken,
};
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::{
    Session, StreamEvent, Transport,
    error::{Error, Result},
    session::EventStream,
    sse::EventDecoder,
    types::{request::ChatRequest, response},
};

/// Upper bound on a single event-stream line.
const MAX_LINE_LENGTH: usize = 1024 * 1024;

type LineStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// What the backend answered a chat request with.
enum Body {
    /// An event stream, read line by line.
    Stream(LineStream),

    /// A complete answer in a single JSON document, already decoded.
    Complete(Vec<StreamEvent>),
}

/// HTTP client for the streaming chat endpoint.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http_client: reqwest::Client,
    idle_timeout: Duration,
}

impl Client {
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeouts(
            base_url,
            Self::DEFAULT_CONNECT_TIMEOUT,
            Self::DEFAULT_IDLE_TIMEOUT,
        )
    }

    /// Create a client with explicit timeouts.
    ///
    /// `idle_timeout` bounds the silence while waiting for the response
    /// headers, and between two lines of the response body.
    pub fn with_timeouts(
        base_url: &str,
        connect_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL `{base_url}`: {e}")))?;

        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Base URL `{base_url}` cannot have a path."
            )));
        }

        let http_client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;

        trace!(
            %base_url,
            connect_timeout = connect_timeout.as_millis(),
            idle_timeout = idle_timeout.as_millis(),
            "Client configured."
        );

        Ok(Self {
            base_url,
            http_client,
            idle_timeout,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The streaming endpoint of `bot`.
    fn chat_url(&self, bot: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("Base URL `{}` cannot have a path.", self.base_url)))?
            .pop_if_empty()
            .push("chat")
            .push(bot);

        Ok(url)
    }

    fn chat_stream(&self, request: ChatRequest, cancel: CancellationToken) -> EventStream {
        let client = self.clone();

        Box::pin(stream! {
            let body = tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                body = client.connect(&request) => body,
            };

            let mut lines = match body {
                Ok(Body::Stream(lines)) => lines,
                Ok(Body::Complete(events)) => {
                    for event in events {
                        yield event;
                    }
                    return;
                }
                Err(error) => {
                    warn!(%error, bot = request.bot, "Failed to open response stream.");
                    yield StreamEvent::from(error);
                    return;
                }
            };

            let mut decoder = EventDecoder::default();
            loop {
                let next = tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!("Abandoning response stream.");
                        return;
                    }
                    next = timeout(client.idle_timeout, lines.next()) => next,
                };

                let payload = match next {
                    Ok(Some(Ok(line))) => decoder.push_line(&line),
                    Ok(Some(Err(error))) => {
                        warn!(%error, "Response stream failed.");
                        yield StreamEvent::from(error);
                        return;
                    }
                    // The session reports a missing terminal event.
                    Ok(None) => match decoder.finish() {
                        Some(payload) => Some(payload),
                        None => return,
                    },
                    Err(_elapsed) => {
                        let error = Error::Timeout(client.idle_timeout);
                        warn!(%error, "Response stream stalled.");
                        yield StreamEvent::from(error);
                        return;
                    }
                };

                let Some(payload) = payload else {
                    continue;
                };

                trace!(payload, "Decoding frame.");
                let events = match response::decode(&payload) {
                    Ok(events) => events,
                    Err(error) => {
                        warn!(%error, "Received malformed frame.");
                        vec![StreamEvent::from(error)]
                    }
                };

                for event in events {
                    let terminal = event.is_terminal();
                    yield event;

                    if terminal {
                        return;
                    }
                }
            }
        })
    }

    async fn connect(&self, request: &ChatRequest) -> Result<Body> {
        let url = self.chat_url(&request.bot)?;

        trace!(%url, chat_id = request.chat_id, "Triggering request.");
        let response = timeout(
            self.idle_timeout,
            self.http_client
                .post(url.clone())
                .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
                .json(request)
                .send(),
        )
        .await
        .map_err(|_| Error::Timeout(self.idle_timeout))??;

        trace!(
            status = response.status().as_u16(),
            content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .map(|v| v.to_str().unwrap_or_default()),
            "Received response."
        );

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let status = status.as_u16();
            let body = response.text().await?;

            error!(status, body, %url, "Unexpected response.");

            return Err(Error::Api {
                code: status,
                message: body,
            });
        }

        if is_json(&response) {
            let body = timeout(self.idle_timeout, response.text())
                .await
                .map_err(|_| Error::Timeout(self.idle_timeout))??;

            debug!(length = body.len(), "Received complete answer instead of a stream.");
            return response::decode_complete(&body).map(Body::Complete);
        }

        let byte_stream = response.bytes_stream().map_err(io::Error::other);
        let lines = FramedRead::new(
            StreamReader::new(byte_stream),
            LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
        )
        .map_err(|e| Error::Stream(e.to_string()));

        Ok(Body::Stream(Box::pin(lines)))
    }
}

/// Whether the response carries a plain JSON document.
fn is_json(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

impl Transport for Client {
    fn open(&self, request: &ChatRequest, cancel: CancellationToken) -> Session {
        debug!(bot = request.bot, "Opening chat session.");
        Session::new(self.chat_stream(request.clone(), cancel.clone()), cancel)
    }
}
