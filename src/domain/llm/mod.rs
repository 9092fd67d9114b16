//! LLM provider contract
//!
//! Every scoring, generation, and validation capability sits on top of
//! this opaque chat interface. Nothing here assumes determinism or
//! idempotence of the underlying model.

mod message;
mod provider;
mod request;
mod response;

pub use message::{Message, MessageRole};
pub use provider::LlmProvider;
pub use request::{LlmRequest, LlmRequestBuilder};
pub use response::{FinishReason, LlmResponse, Usage};

#[cfg(test)]
pub use provider::mock::MockLlmProvider;
