//! Conversation-related types.

use uuid::Uuid;

/// The attribution of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Instructions for the model.
    System,
    /// The person typing into the chat.
    User,
    /// The model.
    Assistant,
}

/// One turn of the conversation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Turn {
    id: String,
    role: Role,
    content: String,
}

impl Turn {
    /// Creates a turn with a fresh opaque identifier.
    #[inline]
    pub fn new<S: Into<String>>(role: Role, content: S) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
        }
    }

    /// Returns the opaque unique identifier of this turn.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns who produced this turn.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the textual content of this turn.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Represents a conversation.
///
/// Turns are ordered and append-only. The sequence lives as long as the
/// chat itself; nothing is ever persisted.
#[derive(Clone, Debug)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Creates a conversation opened by the assistant greeting.
    #[inline]
    pub fn with_greeting<S: Into<String>>(greeting: S) -> Self {
        Self {
            turns: vec![Turn::new(Role::Assistant, greeting)],
        }
    }

    /// Returns the turns in conversation order.
    #[inline]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[inline]
    pub(crate) fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }
}
