use qc_source::{Locator, SourceRef};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    StreamEvent,
    error::{Error, Result},
};

/// Payload some backends send as the very last event.
const DONE_SENTINEL: &str = "[DONE]";

/// A single decoded event-stream payload.
///
/// Every key is optional. A frame may combine several of them, for example
/// the final frame usually carries both `sources` and `done`.
#[derive(Debug, Default, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub chunk: Option<String>,

    #[serde(default)]
    pub sources: Option<Vec<Source>>,

    #[serde(default)]
    pub done: Option<bool>,

    #[serde(default)]
    pub error: Option<String>,
}

impl Frame {
    /// Convert the frame into stream events.
    ///
    /// An `error` takes precedence over everything else in the frame.
    /// Otherwise events are produced in the order text, sources, end.
    #[must_use]
    pub fn into_events(self) -> Vec<StreamEvent> {
        if let Some(message) = self.error {
            return vec![StreamEvent::error(message)];
        }

        let mut events = vec![];
        if let Some(content) = self.chunk {
            events.push(StreamEvent::text(content));
        }

        if let Some(sources) = self.sources {
            events.push(StreamEvent::sources(
                sources.into_iter().map(SourceRef::from).collect::<Vec<_>>(),
            ));
        }

        if self.done == Some(true) {
            events.push(StreamEvent::End);
        }

        events
    }
}

/// A complete answer, sent as a plain JSON body instead of an event stream.
///
/// The backend answers this way when retrieval found nothing to ground an
/// answer on.
#[derive(Debug, Default, Deserialize)]
pub struct ChatResponse {
    pub message: String,

    #[serde(default)]
    pub sources: Vec<Source>,

    #[serde(default)]
    pub chat_id: Option<u64>,
}

impl ChatResponse {
    /// Replay the answer as the events a stream would have produced.
    #[must_use]
    pub fn into_events(self) -> Vec<StreamEvent> {
        let mut events = vec![];
        if !self.message.is_empty() {
            events.push(StreamEvent::text(self.message));
        }

        events.push(StreamEvent::sources(
            self.sources.into_iter().map(SourceRef::from).collect::<Vec<_>>(),
        ));
        events.push(StreamEvent::End);
        events
    }
}

/// A source descriptor as sent by the backend.
#[derive(Debug, Default, Deserialize)]
pub struct Source {
    #[serde(default, alias = "documentName", alias = "filename")]
    pub document_name: Option<String>,

    #[serde(default)]
    pub document_id: Option<u64>,

    #[serde(default)]
    pub location: Option<Location>,

    #[serde(default)]
    pub headings: Option<Vec<String>>,

    #[serde(default, alias = "excerpt", alias = "text")]
    pub snippet: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub page: Option<u32>,

    #[serde(default)]
    pub paragraph: Option<u32>,

    #[serde(default)]
    pub cell: Option<String>,
}

impl From<Source> for SourceRef {
    fn from(source: Source) -> Self {
        let Source {
            document_name,
            document_id,
            location,
            headings,
            snippet,
        } = source;

        Self {
            document_name,
            document_id,
            location: location
                .and_then(|Location { page, paragraph, cell }| {
                    Locator::from_parts(page, paragraph, cell)
                }),
            headings: headings.unwrap_or_default(),
            excerpt: snippet,
        }
    }
}

/// Decode one event-stream payload into stream events.
///
/// A payload that is valid but carries none of the known keys decodes into
/// no events at all.
pub(crate) fn decode(data: &str) -> Result<Vec<StreamEvent>> {
    let data = data.trim();
    if data == DONE_SENTINEL {
        return Ok(vec![StreamEvent::End]);
    }

    let value: Value = serde_json::from_str(data)?;
    if !value.is_object() {
        return Err(Error::MalformedFrame(format!(
            "expected a JSON object, got `{}`",
            truncate(data)
        )));
    }

    Ok(Frame::deserialize(value)?.into_events())
}

/// Decode a complete JSON answer body.
pub(crate) fn decode_complete(body: &str) -> Result<Vec<StreamEvent>> {
    let response: ChatResponse = serde_json::from_str(body.trim())?;
    Ok(response.into_events())
}

fn truncate(data: &str) -> String {
    const MAX: usize = 64;

    if data.chars().count() <= MAX {
        return data.to_owned();
    }

    let mut truncated = data.chars().take(MAX).collect::<String>();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
