use hemachat_core::conversation::Turn;
use hemachat_core::{Chat, ChatBuilder, ChatSnapshot};
use hemachat_model::ModelProvider;

/// The greeting that opens every conversation.
pub const GREETING: &str = "Hello! I am the Anemia AI Assistant. \
    Enter your lab results for AI-based analysis.";

const SYSTEM_PROMPT: &str = include_str!("./system_prompt.md");

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    chat_builder: ChatBuilder,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
    ) -> Self {
        Self::from_chat_builder(ChatBuilder::with_model_provider(provider))
    }

    /// Creates a session builder without a model provider.
    ///
    /// Messages sent to the resulting session are silently dropped, which
    /// is the behavior when no API key is configured.
    pub fn unconfigured() -> Self {
        Self::from_chat_builder(ChatBuilder::unconfigured())
    }

    fn from_chat_builder(chat_builder: ChatBuilder) -> Self {
        let chat_builder = chat_builder
            .with_system_prompt(SYSTEM_PROMPT.trim())
            .with_greeting(GREETING);
        Self { chat_builder }
    }

    /// Attaches a callback to be invoked for every appended turn, the
    /// greeting included.
    #[inline]
    pub fn on_turn(
        mut self,
        on_turn: impl Fn(&Turn) + Send + Sync + 'static,
    ) -> Self {
        self.chat_builder = self.chat_builder.on_turn(on_turn);
        self
    }

    /// Attaches a callback to be invoked when the session is idle.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.chat_builder = self.chat_builder.on_idle(on_idle);
        self
    }

    /// Builds a new session.
    pub fn build(self) -> Session {
        Session {
            chat: self.chat_builder.build(),
        }
    }
}

/// A chat session, like a page that displays messages and has an input box.
///
/// The session holds a fully configured chat that you can use directly, and
/// it is basically a wrapper around [`Chat`].
pub struct Session {
    chat: Chat,
}

impl Session {
    /// Sends a message to the session.
    #[inline]
    pub fn send_message(&self, message: &str) {
        self.chat.submit(message);
    }

    /// Replaces the text in the input box.
    #[inline]
    pub fn set_input(&self, text: &str) {
        self.chat.set_draft(text);
    }

    /// Submits the text currently in the input box.
    #[inline]
    pub fn submit_input(&self) {
        self.chat.submit_draft();
    }

    /// Returns a snapshot of the session state.
    #[inline]
    pub async fn snapshot(&self) -> ChatSnapshot {
        self.chat.snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use hemachat_model::ModelMessage;
    use hemachat_test_model::{PresetOutcome, TestModelProvider};
    use tokio::sync::watch;
    use tokio::time::timeout;

    use super::*;
    use crate::core::conversation::Role;

    #[tokio::test]
    async fn test_session_round_trip() {
        let mut model_provider = TestModelProvider::default();
        model_provider.add_outcome(PresetOutcome::Reply(
            "That is consistent with iron deficiency.".to_owned(),
        ));
        let observer = model_provider.clone();

        let (idle_tx, mut idle_rx) = watch::channel(false);
        let session = SessionBuilder::with_model_provider(model_provider)
            .on_idle(move || {
                idle_tx.send(true).unwrap();
            })
            .build();

        session.send_message("MCV is 72 fL");
        timeout(Duration::from_millis(500), idle_rx.wait_for(|idle| *idle))
            .await
            .unwrap()
            .unwrap();

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.turns.len(), 3);
        assert_eq!(snapshot.turns[0].role(), Role::Assistant);
        assert_eq!(snapshot.turns[0].content(), GREETING);
        assert_eq!(
            snapshot.turns[2].content(),
            "That is consistent with iron deficiency."
        );

        assert_eq!(
            observer.last_request().unwrap().messages,
            vec![
                ModelMessage::System(
                    "You are an anemia AI assistant.".to_owned()
                ),
                ModelMessage::User("MCV is 72 fL".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn test_input_box_flow() {
        let mut model_provider = TestModelProvider::default();
        model_provider.add_outcome(PresetOutcome::Reply("Noted.".to_owned()));

        let (idle_tx, mut idle_rx) = watch::channel(false);
        let session = SessionBuilder::with_model_provider(model_provider)
            .on_idle(move || {
                idle_tx.send(true).unwrap();
            })
            .build();

        session.set_input("Hematocrit is 28%");
        session.submit_input();
        timeout(Duration::from_millis(500), idle_rx.wait_for(|idle| *idle))
            .await
            .unwrap()
            .unwrap();

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.draft, "");
        assert_eq!(snapshot.turns[1].content(), "Hematocrit is 28%");
    }
}
