/// Reasons a submission is turned away without touching the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("message is empty")]
    Empty,

    #[error("an answer is still being received")]
    Busy,
}
