use serde::Serialize;

/// A single user turn sent to a bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// Slug of the bot to converse with. Part of the URL, not the body.
    #[serde(skip)]
    pub bot: String,

    /// The user's utterance.
    pub message: String,

    /// Backend conversation to continue, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<u64>,
}

impl ChatRequest {
    #[must_use]
    pub fn new(bot: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            bot: bot.into(),
            message: message.into(),
            chat_id: None,
        }
    }

    #[must_use]
    pub fn with_chat_id(mut self, chat_id: Option<u64>) -> Self {
        self.chat_id = chat_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_body_excludes_bot() {
        let body = serde_json::to_value(ChatRequest::new("acme", "Hi")).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "Hi" }));

        let body =
            serde_json::to_value(ChatRequest::new("acme", "Hi").with_chat_id(Some(7))).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "Hi", "chat_id": 7 }));
    }
}
