use std::sync::Arc;

use super::picker::{AgentPicker, ThreadRngPicker};
use super::prompt::{FALLBACK_AGENT_NAME, FALLBACK_SYSTEM_PROMPT};
use super::registry::PersonalityRegistry;
use crate::llm::provider::{CompletionInput, LlmProvider, LlmResult};

/// What `/chat` sends back. Provider failures land in `response` as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    pub agent: String,
}

/// Structured result of one dispatch, before provider errors are flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub agent: String,
    pub result: LlmResult<String>,
}

impl From<DispatchOutcome> for ChatReply {
    fn from(outcome: DispatchOutcome) -> Self {
        let response = match outcome.result {
            Ok(text) => text,
            Err(err) => err.to_string(),
        };
        Self {
            response,
            agent: outcome.agent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedAgent {
    name: String,
    system_prompt: String,
}

/// Resolves the agent for each chat message and relays it to the completion provider.
pub struct Dispatcher<P> {
    registry: Arc<PersonalityRegistry>,
    provider: P,
    picker: Box<dyn AgentPicker>,
}

impl<P: LlmProvider + Send + Sync> Dispatcher<P> {
    pub fn new(registry: Arc<PersonalityRegistry>, provider: P) -> Self {
        Self {
            registry,
            provider,
            picker: Box::new(ThreadRngPicker),
        }
    }

    pub fn with_picker(mut self, picker: impl AgentPicker + 'static) -> Self {
        self.picker = Box::new(picker);
        self
    }

    pub fn registry(&self) -> &Arc<PersonalityRegistry> {
        &self.registry
    }

    /// Sends `message` to the provider under the requested agent's prompt and
    /// flattens any provider failure into the reply text. Never fails.
    pub async fn handle(&self, message: &str, agent: Option<&str>) -> ChatReply {
        self.dispatch(message, agent).await.into()
    }

    pub async fn dispatch(&self, message: &str, agent: Option<&str>) -> DispatchOutcome {
        let resolved = self.resolve(agent);
        tracing::info!(agent = %resolved.name, "dispatching chat message");

        let input = CompletionInput {
            system_prompt: resolved.system_prompt,
            user_message: message.to_string(),
        };
        let result = self
            .provider
            .complete(input)
            .await
            .map(|output| output.text);

        if let Err(err) = &result {
            tracing::warn!(agent = %resolved.name, error = %err, "completion provider failed");
        }

        DispatchOutcome {
            agent: resolved.name,
            result,
        }
    }

    fn resolve(&self, agent: Option<&str>) -> ResolvedAgent {
        match agent {
            Some(name) => {
                let system_prompt = match self.registry.get(name) {
                    Some(personality) => personality.system_prompt,
                    None => {
                        tracing::debug!(agent = %name, "unknown agent, using fallback prompt");
                        FALLBACK_SYSTEM_PROMPT.to_string()
                    }
                };
                ResolvedAgent {
                    name: name.to_string(),
                    system_prompt,
                }
            }
            None => self.pick_random(),
        }
    }

    fn pick_random(&self) -> ResolvedAgent {
        let mut names = self.registry.list_names();
        if names.is_empty() {
            return ResolvedAgent {
                name: FALLBACK_AGENT_NAME.to_string(),
                system_prompt: FALLBACK_SYSTEM_PROMPT.to_string(),
            };
        }

        let index = self.picker.pick(names.len()).min(names.len() - 1);
        let name = names.swap_remove(index);
        let system_prompt = self
            .registry
            .get(&name)
            .map(|personality| personality.system_prompt)
            .unwrap_or_else(|| FALLBACK_SYSTEM_PROMPT.to_string());
        ResolvedAgent {
            name,
            system_prompt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatReply, Dispatcher};
    use crate::agent::picker::AgentPicker;
    use crate::agent::prompt::{BUILTIN_PERSONALITIES, FALLBACK_AGENT_NAME, FALLBACK_SYSTEM_PROMPT};
    use crate::agent::registry::PersonalityRegistry;
    use crate::llm::provider::{CompletionInput, CompletionOutput, LlmError, LlmProvider};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    struct FakeProvider {
        reply: Result<String, LlmError>,
        seen_inputs: Arc<Mutex<Vec<CompletionInput>>>,
    }

    impl FakeProvider {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen_inputs: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing(err: LlmError) -> Self {
            Self {
                reply: Err(err),
                seen_inputs: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl LlmProvider for FakeProvider {
        async fn complete(&self, input: CompletionInput) -> Result<CompletionOutput, LlmError> {
            self.seen_inputs.lock().expect("lock").push(input);
            self.reply.clone().map(|text| CompletionOutput { text })
        }
    }

    struct FixedPicker(usize);

    impl AgentPicker for FixedPicker {
        fn pick(&self, _len: usize) -> usize {
            self.0
        }
    }

    fn dispatcher(provider: FakeProvider) -> (Dispatcher<FakeProvider>, Arc<Mutex<Vec<CompletionInput>>>) {
        let seen = Arc::clone(&provider.seen_inputs);
        let registry = Arc::new(PersonalityRegistry::with_builtins());
        (Dispatcher::new(registry, provider), seen)
    }

    fn builtin_prompt(name: &str) -> &'static str {
        BUILTIN_PERSONALITIES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, prompt)| *prompt)
            .expect("builtin exists")
    }

    #[tokio::test]
    async fn handle_uses_registered_prompt_for_named_agent() {
        let (dispatcher, seen) = dispatcher(FakeProvider::replying("Kernels are fun."));

        let reply = dispatcher.handle("what is a kernel?", Some("Tech Expert")).await;

        assert_eq!(
            reply,
            ChatReply {
                response: "Kernels are fun.".to_string(),
                agent: "Tech Expert".to_string(),
            }
        );
        let seen = seen.lock().expect("lock");
        assert_eq!(
            *seen,
            vec![CompletionInput {
                system_prompt: builtin_prompt("Tech Expert").to_string(),
                user_message: "what is a kernel?".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn handle_falls_back_for_unknown_agent_and_echoes_its_name() {
        let (dispatcher, seen) = dispatcher(FakeProvider::replying("hello"));

        let reply = dispatcher.handle("hi", Some("NoSuchAgent")).await;

        assert_eq!(reply.agent, "NoSuchAgent");
        assert_eq!(reply.response, "hello");
        let seen = seen.lock().expect("lock");
        assert_eq!(seen[0].system_prompt, FALLBACK_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn handle_treats_empty_agent_name_as_unknown() {
        let (dispatcher, seen) = dispatcher(FakeProvider::replying("hello"));

        let reply = dispatcher.handle("hi", Some("")).await;

        assert_eq!(reply.agent, "");
        assert_eq!(seen.lock().expect("lock")[0].system_prompt, FALLBACK_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn handle_picks_agent_through_injected_picker() {
        let (dispatcher, seen) = dispatcher(FakeProvider::replying("ok"));
        let dispatcher = dispatcher.with_picker(FixedPicker(1));

        let reply = dispatcher.handle("hi", None).await;

        // sorted names: Creative Writer, Life Coach, Tech Expert
        assert_eq!(reply.agent, "Life Coach");
        assert_eq!(
            seen.lock().expect("lock")[0].system_prompt,
            builtin_prompt("Life Coach")
        );
    }

    #[tokio::test]
    async fn handle_clamps_out_of_range_pick() {
        let (dispatcher, _seen) = dispatcher(FakeProvider::replying("ok"));
        let dispatcher = dispatcher.with_picker(FixedPicker(99));

        let reply = dispatcher.handle("hi", None).await;

        assert_eq!(reply.agent, "Tech Expert");
    }

    #[tokio::test]
    async fn handle_with_empty_registry_uses_fallback_identity() {
        let provider = FakeProvider::replying("ok");
        let seen = Arc::clone(&provider.seen_inputs);
        let dispatcher = Dispatcher::new(Arc::new(PersonalityRegistry::new()), provider);

        let reply = dispatcher.handle("hi", None).await;

        assert_eq!(reply.agent, FALLBACK_AGENT_NAME);
        assert_eq!(seen.lock().expect("lock")[0].system_prompt, FALLBACK_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn handle_forwards_empty_message_verbatim() {
        let (dispatcher, seen) = dispatcher(FakeProvider::replying("?"));

        dispatcher.handle("", Some("Life Coach")).await;

        assert_eq!(seen.lock().expect("lock")[0].user_message, "");
    }

    #[tokio::test]
    async fn handle_sees_personalities_added_after_construction() {
        let (dispatcher, seen) = dispatcher(FakeProvider::replying("Arr"));
        dispatcher
            .registry()
            .add("Pirate", "Talk like a pirate.")
            .expect("add succeeds");

        let reply = dispatcher.handle("hi", Some("Pirate")).await;

        assert_eq!(reply.agent, "Pirate");
        assert_eq!(seen.lock().expect("lock")[0].system_prompt, "Talk like a pirate.");
    }

    #[tokio::test]
    async fn handle_renders_provider_error_as_response_text() {
        let err = LlmError::HttpStatus {
            status: 401,
            body: "invalid key".to_string(),
        };
        let (dispatcher, _seen) = dispatcher(FakeProvider::failing(err.clone()));

        let reply = dispatcher.handle("hi", Some("Tech Expert")).await;

        assert_eq!(reply.response, err.to_string());
        assert_eq!(reply.agent, "Tech Expert");
    }

    #[tokio::test]
    async fn dispatch_keeps_structured_error() {
        let (dispatcher, _seen) = dispatcher(FakeProvider::failing(LlmError::MissingApiKey));

        let outcome = dispatcher.dispatch("hi", Some("Tech Expert")).await;

        assert_eq!(outcome.result, Err(LlmError::MissingApiKey));
    }

    #[tokio::test]
    async fn handle_without_agent_selects_names_roughly_uniformly() {
        let (dispatcher, _seen) = dispatcher(FakeProvider::replying("ok"));
        let trials = 3_000;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..trials {
            let reply = dispatcher.handle("hi", None).await;
            *counts.entry(reply.agent).or_default() += 1;
        }

        assert_eq!(counts.len(), BUILTIN_PERSONALITIES.len());
        let expected = trials / BUILTIN_PERSONALITIES.len();
        for (name, count) in counts {
            assert!(
                count.abs_diff(expected) < expected / 5,
                "{name} selected {count} times, expected about {expected}"
            );
        }
    }
}
