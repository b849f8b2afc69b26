//! Remote transform client for OpenAI-style completion services.

mod client;
mod error;
mod types;

pub use client::{DEFAULT_BASE_URL, TransformBackend, TransformClient};
pub use error::ClientError;
pub use types::{ChatRequest, ChatResponse, Message, ModelDescriptor, Role};
