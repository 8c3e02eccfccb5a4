pub mod chat_backend;
pub mod openai_chat;
#[cfg(any(test, feature = "mock"))]
pub mod scripted;

pub use chat_backend::{ChatBackend, ChatRequest};
pub use openai_chat::OpenAiChat;
#[cfg(any(test, feature = "mock"))]
pub use scripted::{ScriptedBackend, ScriptedReply};
