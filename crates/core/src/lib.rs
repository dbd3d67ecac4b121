//! Core logic of the chat assistant: conversation state and the
//! submit-and-respond cycle.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod chat;
pub mod conversation;
mod model_client;

pub use chat::{Chat, ChatBuilder, ChatSnapshot, ChatStage};
