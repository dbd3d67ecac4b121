use hemachat_model::{ModelMessage, ModelRequest};
use tokio::sync::{mpsc, oneshot};

use super::builder::ChatBuilder;
use super::{ChatSnapshot, ChatStage};
use crate::conversation::{Conversation, Role, Turn};
use crate::model_client::{ModelClient, SendRequestResult};

pub enum Event {
    SetDraft(String),
    Submit(Option<String>),
    ReplyFinished {
        client: ModelClient,
        result: SendRequestResult,
    },
    Query(oneshot::Sender<ChatSnapshot>),
}

type TurnCallback = Box<dyn Fn(&Turn) + Send + Sync>;
type IdleCallback = Box<dyn Fn() + Send + Sync>;

pub struct ChatState {
    client: Option<ModelClient>,
    conversation: Conversation,
    draft: String,
    stage: ChatStage,
    system_prompt: String,
    fallback_reply: String,
    failure_reply: String,
    on_turn: Option<TurnCallback>,
    on_idle: Option<IdleCallback>,
    event_tx: mpsc::WeakUnboundedSender<Event>,
}

pub async fn run(
    mut state: ChatState,
    mut event_rx: mpsc::UnboundedReceiver<Event>,
) {
    debug!("started");
    while let Some(event) = event_rx.recv().await {
        state.handle(event);
    }
    debug!("will terminate");
}

impl ChatState {
    pub fn from_builder(
        builder: ChatBuilder,
        event_tx: mpsc::WeakUnboundedSender<Event>,
    ) -> Self {
        let ChatBuilder {
            client,
            system_prompt,
            greeting,
            fallback_reply,
            failure_reply,
            on_turn,
            on_idle,
        } = builder;

        let state = Self {
            client,
            conversation: Conversation::with_greeting(greeting),
            draft: String::new(),
            stage: ChatStage::default(),
            system_prompt,
            fallback_reply,
            failure_reply,
            on_turn,
            on_idle,
            event_tx,
        };
        if let Some(greeting_turn) = state.conversation.turns().first() {
            state.notify_turn(greeting_turn);
        }
        state
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::SetDraft(text) => self.draft = text,
            Event::Submit(text) => self.submit(text),
            Event::ReplyFinished { client, result } => {
                self.finish_reply(client, result);
            }
            Event::Query(tx) => {
                tx.send(self.snapshot()).ok();
            }
        }
    }

    fn submit(&mut self, text: Option<String>) {
        if self.stage != ChatStage::Idle {
            debug!("dropped a submission: another request is in flight");
            return;
        }
        let Some(event_tx) = self.event_tx.upgrade() else {
            warn!("last chat handle has been dropped, discard the submission");
            return;
        };
        let Some(client) = self.client.take() else {
            // No credential was configured. The submission disappears with
            // no user-visible feedback, but the cycle still ends so
            // observers waiting on idle are not left hanging.
            debug!("dropped a submission: no model client is configured");
            self.notify_idle();
            return;
        };

        let text = match text {
            Some(text) => text,
            None => self.draft.clone(),
        };
        self.draft.clear();
        self.stage = ChatStage::AwaitingReply;
        self.push_turn(Turn::new(Role::User, text.clone()));

        // Only the fixed system prompt and the new user text are sent.
        // Prior turns stay local.
        let request = ModelRequest {
            messages: vec![
                ModelMessage::System(self.system_prompt.clone()),
                ModelMessage::User(text),
            ],
        };
        tokio::spawn(async move {
            let result = client.send_request(request).await;
            event_tx
                .send(Event::ReplyFinished { client, result })
                .ok();
        });
    }

    fn finish_reply(&mut self, client: ModelClient, result: SendRequestResult) {
        let content = match result {
            Ok(reply) => reply
                .content
                .unwrap_or_else(|| self.fallback_reply.clone()),
            Err(err) => {
                error!(
                    "error fetching the assistant reply: {err} (kind: {:?})",
                    err.kind()
                );
                self.failure_reply.clone()
            }
        };
        self.push_turn(Turn::new(Role::Assistant, content));

        // The client must come back and the stage must return to idle on
        // every exit path, or the chat would be stuck busy forever.
        self.client = Some(client);
        self.stage = ChatStage::Idle;
        self.notify_idle();
    }

    fn push_turn(&mut self, turn: Turn) {
        self.conversation.push(turn);
        if let Some(turn) = self.conversation.turns().last() {
            self.notify_turn(turn);
        }
    }

    fn notify_turn(&self, turn: &Turn) {
        if let Some(on_turn) = &self.on_turn {
            on_turn(turn);
        }
    }

    fn notify_idle(&self) {
        if let Some(on_idle) = &self.on_idle {
            on_idle();
        }
    }

    fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            turns: self.conversation.turns().to_vec(),
            draft: self.draft.clone(),
            stage: self.stage,
        }
    }
}
