use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AppState;
use crate::agent::ChatReply;
use crate::llm::provider::LlmProvider;

pub const ADD_SUCCESS_MESSAGE: &str = "Personality added successfully.";
pub const ADD_INVALID_MESSAGE: &str = "Invalid data.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    /// Any JSON value; `null` or absent means "pick one at random".
    #[serde(default)]
    pub agent: Option<Value>,
}

impl ChatRequest {
    /// Non-string agents are looked up (and echoed) by their JSON text.
    pub fn agent_name(&self) -> Option<String> {
        match self.agent.as_ref()? {
            Value::Null => None,
            Value::String(name) => Some(name.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub agent: String,
}

impl From<ChatReply> for ChatResponse {
    fn from(reply: ChatReply) -> Self {
        Self {
            response: reply.response,
            agent: reply.agent,
        }
    }
}

/// Fields stay loosely typed so a wrong-typed value is answered with
/// "Invalid data." rather than an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddPersonalityRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub personality: Option<Value>,
}

impl AddPersonalityRequest {
    fn text_field(value: Option<&Value>) -> &str {
        value.and_then(Value::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPersonalityResponse {
    pub success: bool,
    pub message: String,
}

/// POST /chat
pub async fn chat<P>(
    State(state): State<AppState<P>>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse>
where
    P: LlmProvider + Send + Sync + 'static,
{
    let agent = request.agent_name();
    let reply = state
        .dispatcher
        .handle(&request.message, agent.as_deref())
        .await;
    Json(reply.into())
}

/// POST /add_personality
pub async fn add_personality<P>(
    State(state): State<AppState<P>>,
    Json(request): Json<AddPersonalityRequest>,
) -> Json<AddPersonalityResponse>
where
    P: LlmProvider + Send + Sync + 'static,
{
    let name = AddPersonalityRequest::text_field(request.name.as_ref());
    let prompt = AddPersonalityRequest::text_field(request.personality.as_ref());

    let response = match state.dispatcher.registry().add(name, prompt) {
        Ok(()) => {
            tracing::info!(agent = %name, "personality registered");
            AddPersonalityResponse {
                success: true,
                message: ADD_SUCCESS_MESSAGE.to_string(),
            }
        }
        Err(err) => {
            tracing::debug!(error = %err, "rejected personality registration");
            AddPersonalityResponse {
                success: false,
                message: ADD_INVALID_MESSAGE.to_string(),
            }
        }
    };
    Json(response)
}
