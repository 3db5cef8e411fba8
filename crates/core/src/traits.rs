use crate::{InferenceError, InferenceRequest};
use async_trait::async_trait;

/// A chat-completion service that turns a prompt into an answer.
#[async_trait]
pub trait InferenceGateway {
    async fn predict(&self, request: &InferenceRequest) -> Result<String, InferenceError>;
}
