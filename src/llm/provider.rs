use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionInput {
    pub system_prompt: String,
    pub user_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutput {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("missing OPENAI_API_KEY")]
    MissingApiKey,
    #[error("provider request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("provider transport error: {0}")]
    Transport(String),
    #[error("provider parse error: {0}")]
    Parse(String),
    #[error("provider returned no completion choices")]
    EmptyResponse,
}

pub type LlmResult<T> = std::result::Result<T, LlmError>;

/// A remote completion capability: system prompt and user message in, text out.
pub trait LlmProvider {
    fn complete(
        &self,
        input: CompletionInput,
    ) -> impl std::future::Future<Output = LlmResult<CompletionOutput>> + Send;
}
