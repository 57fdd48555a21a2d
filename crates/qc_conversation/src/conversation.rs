//! See [`Conversation`].

use crate::{Role, Turn, TurnId};

/// The ordered turns of a single conversation.
///
/// Lives for as long as the value does; nothing is persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    turns: Vec<Turn>,

    /// Last issued identifier, kept across [`Conversation::clear`] so that
    /// identifiers never repeat.
    last_id: Option<TurnId>,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: TurnId) -> Option<&Turn> {
        self.turns.iter().find(|turn| turn.id() == id)
    }

    /// All assistant turns, oldest first.
    pub fn assistant_turns(&self) -> impl DoubleEndedIterator<Item = &Turn> {
        self.turns.iter().filter(|turn| turn.role() == Role::Assistant)
    }

    /// The most recent assistant turn, in flight or not.
    #[must_use]
    pub fn last_assistant(&self) -> Option<&Turn> {
        self.assistant_turns().next_back()
    }

    pub(crate) fn next_id(&mut self) -> TurnId {
        let id = TurnId::next(self.last_id);
        self.last_id = Some(id);
        id
    }

    /// Append a turn, returning its index.
    pub(crate) fn push(&mut self, turn: Turn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    pub(crate) fn turn_mut(&mut self, index: usize) -> Option<&mut Turn> {
        self.turns.get_mut(index)
    }

    pub(crate) fn turn(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<Turn> {
        (index < self.turns.len()).then(|| self.turns.remove(index))
    }

    pub(crate) fn clear(&mut self) {
        self.turns.clear();
    }
}
