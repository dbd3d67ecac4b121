use hemachat_model::ModelProvider;

use super::Chat;
use crate::conversation::Turn;
use crate::model_client::ModelClient;

const DEFAULT_GREETING: &str = "Hello! How can I help you today?";
const DEFAULT_FALLBACK_REPLY: &str = "I'm sorry, I didn't understand that.";
const DEFAULT_FAILURE_REPLY: &str = "An error occurred. Please try again.";

/// [`Chat`] builder.
pub struct ChatBuilder {
    pub(crate) client: Option<ModelClient>,
    pub(crate) system_prompt: String,
    pub(crate) greeting: String,
    pub(crate) fallback_reply: String,
    pub(crate) failure_reply: String,
    pub(crate) on_turn: Option<Box<dyn Fn(&Turn) + Send + Sync>>,
    pub(crate) on_idle: Option<Box<dyn Fn() + Send + Sync>>,
}

impl ChatBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            client: Some(ModelClient::new(provider)),
            ..Self::unconfigured()
        }
    }

    /// Creates a builder without a model provider.
    ///
    /// Submissions on the resulting chat are silently dropped. This is
    /// the chat to build when no API credential is available.
    #[inline]
    pub fn unconfigured() -> Self {
        Self {
            client: None,
            system_prompt: String::new(),
            greeting: DEFAULT_GREETING.to_owned(),
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_owned(),
            failure_reply: DEFAULT_FAILURE_REPLY.to_owned(),
            on_turn: None,
            on_idle: None,
        }
    }

    /// Sets the system prompt sent with every request.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets the assistant greeting that opens the conversation.
    #[inline]
    pub fn with_greeting<S: Into<String>>(mut self, greeting: S) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Sets the reply shown when a response carries no completion text.
    #[inline]
    pub fn with_fallback_reply<S: Into<String>>(mut self, reply: S) -> Self {
        self.fallback_reply = reply.into();
        self
    }

    /// Sets the reply shown when a request fails.
    #[inline]
    pub fn with_failure_reply<S: Into<String>>(mut self, reply: S) -> Self {
        self.failure_reply = reply.into();
        self
    }

    /// Attaches a callback to be invoked for every appended turn, the
    /// greeting included.
    #[inline]
    pub fn on_turn(
        mut self,
        on_turn: impl Fn(&Turn) + Send + Sync + 'static,
    ) -> Self {
        self.on_turn = Some(Box::new(on_turn));
        self
    }

    /// Attaches a callback to be invoked when a submit cycle ends and the
    /// chat is idle again.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_idle = Some(Box::new(on_idle));
        self
    }

    /// Builds the chat.
    #[inline]
    pub fn build(self) -> Chat {
        Chat::spawn_from_builder(self)
    }
}
