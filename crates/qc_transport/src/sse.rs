//! Line-oriented decoding of `text/event-stream` bodies.

use tracing::trace;

/// Assembles event-stream lines into event payloads.
///
/// Only the `data` field is of interest. Multiple `data` lines belonging to
/// the same event are joined with a newline, and an empty line dispatches the
/// event. Comments and the `event`, `id` and `retry` fields are skipped.
#[derive(Debug, Default)]
pub(crate) struct EventDecoder {
    data: Option<String>,
}

impl EventDecoder {
    /// Feed a single line (without its line terminator).
    ///
    /// Returns the payload of an event if `line` completes one.
    pub(crate) fn push_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.data.take();
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => match &mut self.data {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_owned()),
            },
            field => trace!(field, "Skipping event-stream field."),
        }

        None
    }

    /// Take the payload of an event that was not terminated by an empty line
    /// before the body ended.
    pub(crate) fn finish(&mut self) -> Option<String> {
        self.data.take()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn decode(body: &str) -> Vec<String> {
        let mut decoder = EventDecoder::default();
        let mut events = body
            .split('\n')
            .filter_map(|line| decoder.push_line(line.trim_end_matches('\r')))
            .collect::<Vec<_>>();

        events.extend(decoder.finish());
        events
    }

    #[test]
    fn test_single_line_events() {
        assert_eq!(
            decode("data: {\"chunk\": \"a\"}\n\ndata: {\"chunk\": \"b\"}\n\n"),
            vec![r#"{"chunk": "a"}"#, r#"{"chunk": "b"}"#]
        );
    }

    #[test]
    fn test_multi_line_data_is_joined() {
        assert_eq!(decode("data: first\ndata: second\n\n"), vec![
            "first\nsecond"
        ]);
    }

    #[test]
    fn test_comments_and_other_fields_are_skipped() {
        assert_eq!(
            decode(": keep-alive\nevent: message\nid: 4\nretry: 100\ndata: x\n\n"),
            vec!["x"]
        );
    }

    #[test]
    fn test_missing_space_after_colon() {
        assert_eq!(decode("data:x\n\n"), vec!["x"]);
    }

    #[test]
    fn test_only_one_leading_space_is_stripped() {
        assert_eq!(decode("data:   x\n\n"), vec!["  x"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(decode("data: x\r\n\r\n"), vec!["x"]);
    }

    #[test]
    fn test_unterminated_event_is_flushed() {
        assert_eq!(decode("data: tail"), vec!["tail"]);
    }

    #[test]
    fn test_blank_lines_without_data_dispatch_nothing() {
        assert_eq!(decode("\n\n\n"), Vec::<String>::new());
    }
}
