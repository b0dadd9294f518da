pub mod client;
pub mod openai_compat;

#[cfg(feature = "testing")]
pub mod stub;

pub use client::{ChatMessage, ChatRole, LlmClient, LlmError};
pub use openai_compat::OpenAiCompatClient;

#[cfg(feature = "testing")]
pub use stub::StubLlmClient;
