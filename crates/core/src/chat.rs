mod builder;
mod state;
#[cfg(test)]
mod tests;

use tokio::sync::{mpsc, oneshot};

use crate::conversation::Turn;
pub use builder::ChatBuilder;
use state::{ChatState, Event};

/// The stage of the submit-and-respond cycle.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub enum ChatStage {
    /// No request is in flight.
    #[default]
    Idle,
    /// A request is in flight. Further submissions are dropped until the
    /// request resolves.
    AwaitingReply,
}

/// A point-in-time view of the chat state.
#[derive(Clone, Debug)]
pub struct ChatSnapshot {
    /// The turns in conversation order.
    pub turns: Vec<Turn>,
    /// The pending input text.
    pub draft: String,
    /// The current stage.
    pub stage: ChatStage,
}

/// The chat widget state: an ordered list of turns, the pending input
/// text, and a gate that keeps at most one request in flight.
///
/// A `Chat` is a handle to a spawned task that owns the state and handles
/// events one at a time. The network exchange runs concurrently with the
/// task and reports back to it, so the user turn is always appended
/// before its request starts, and the assistant turn only after the
/// request resolves. An in-flight request cannot be cancelled.
pub struct Chat {
    event_tx: mpsc::UnboundedSender<Event>,
}

impl Chat {
    /// Replaces the pending input text.
    pub fn set_draft<S: Into<String>>(&self, text: S) {
        self.send_event(Event::SetDraft(text.into()));
    }

    /// Submits a pre-supplied text.
    ///
    /// The submission is silently dropped when no model client is
    /// configured, or when another request is currently in flight. The
    /// pending input text is cleared either way once the submission is
    /// accepted.
    pub fn submit<S: Into<String>>(&self, text: S) {
        self.send_event(Event::Submit(Some(text.into())));
    }

    /// Submits the current pending input text.
    ///
    /// Same dropping rules as [`Chat::submit`].
    pub fn submit_draft(&self) {
        self.send_event(Event::Submit(None));
    }

    /// Returns a snapshot of the current state.
    pub async fn snapshot(&self) -> ChatSnapshot {
        let (tx, rx) = oneshot::channel();
        self.send_event(Event::Query(tx));
        rx.await.expect("chat task has been dropped too early")
    }

    fn send_event(&self, event: Event) {
        self.event_tx
            .send(event)
            .expect("chat task has been dropped too early");
    }
}

impl Chat {
    fn spawn_from_builder(builder: ChatBuilder) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let state = ChatState::from_builder(builder, event_tx.downgrade());
        tokio::spawn(state::run(state, event_rx));
        Self { event_tx }
    }
}
