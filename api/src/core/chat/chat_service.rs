//! Request orchestration for `/ai`.
//!
//! parse → resolve conversation → optional search → assemble → model ladder →
//! store answer → reply. The store is written only after generation
//! succeeds, so a failed request leaves earlier context untouched.

use tracing::{debug, info, instrument};

use crate::{
    core::{
        app_state::AppState,
        chat::prompt::{PromptContext, StructuredPrompt, parse_prompt, search_query},
        config::ContextPolicy,
    },
    error_handler::{AppError, AppResult},
};

/// Successful chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Code to continue this conversation with.
    pub code: String,
    pub text: String,
    /// Model tier that produced `text`.
    pub model: String,
}

impl ChatReply {
    /// `<persona> says, "<text>" #<code>`
    pub fn format(&self, persona: &str) -> String {
        format!("{persona} says, \"{}\" #{}", self.text, self.code)
    }
}

#[instrument(skip_all, fields(prompt_len = raw.len()))]
pub async fn chat(state: &AppState, raw: &str) -> AppResult<ChatReply> {
    let parsed = parse_prompt(raw).ok_or(AppError::NoPrompt)?;

    // Unknown codes are a fresh conversation, not an error.
    let (known_code, previous) = match parsed.code {
        Some(code) => match state.store.get(code) {
            Some(prev) => (Some(code), Some(prev)),
            None => {
                debug!(code, "unknown conversation code; starting fresh");
                (None, None)
            }
        },
        None => (None, None),
    };

    let mut body = parsed.body;
    let mut search_block = None;

    if let Some(search) = &state.search {
        if let Some(query) = search_query(parsed.body) {
            if query.is_empty() {
                return Err(AppError::NoSearchQuery);
            }
            body = query;
            search_block =
                web_search::search_context(search.backend.as_ref(), query, search.max_results)
                    .await?;
            if search_block.is_none() {
                info!("web search returned no usable snippets");
            }
        }
    }

    let context = merge_context(state.config.context_policy, previous, search_block);
    let prompt = StructuredPrompt::new(state.config.reply_max_chars, context, body);

    let generation = state.resolver.generate(&prompt.render()).await?;

    let code = match known_code {
        Some(code) => code.to_string(),
        None => state.store.generate_code(),
    };
    state.store.put(code.as_str(), generation.text.as_str());

    info!(
        code = %code,
        model = %generation.model,
        continued = known_code.is_some(),
        "chat turn completed"
    );

    Ok(ChatReply {
        code,
        text: generation.text,
        model: generation.model,
    })
}

fn merge_context(
    policy: ContextPolicy,
    conversation: Option<String>,
    search: Option<String>,
) -> Vec<PromptContext> {
    let conversation = conversation.map(PromptContext::Conversation);
    let search = search.map(PromptContext::Search);
    match (policy, conversation, search) {
        (ContextPolicy::SearchWins, _, Some(s)) => vec![s],
        (_, c, s) => c.into_iter().chain(s).collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use ai_llm_service::{
        error_handler::{AiLlmError, Provider, ProviderError, ProviderErrorKind},
        generator::TextGenerator,
        model_resolver::{ModelResolver, ModelTier},
    };
    use async_trait::async_trait;
    use conversation_store::ConversationStore;
    use tokio::sync::Mutex;
    use web_search::{SearchError, SearchSnippet, WebSearch};

    use super::*;
    use crate::core::{app_state::SearchHandle, config::ApiConfig};

    /// Records every prompt; answers with `answer` or a non-quota failure.
    struct Recorder {
        answer: Option<&'static str>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for Recorder {
        fn model(&self) -> &str {
            "fake-pro"
        }

        async fn generate(&self, prompt: &str) -> Result<String, AiLlmError> {
            self.prompts.lock().await.push(prompt.to_string());
            self.answer.map(str::to_string).ok_or_else(|| {
                ProviderError::new(Provider::Gemini, ProviderErrorKind::EmptyChoices).into()
            })
        }
    }

    struct FixedSearch(Result<Vec<SearchSnippet>, ()>);

    #[async_trait]
    impl WebSearch for FixedSearch {
        async fn search(&self, _query: &str) -> Result<Vec<SearchSnippet>, SearchError> {
            self.0
                .clone()
                .map_err(|_| SearchError::Decode("boom".into()))
        }
    }

    fn setup(
        answer: Option<&'static str>,
        search: Option<FixedSearch>,
        policy: ContextPolicy,
    ) -> (AppState, Arc<Recorder>) {
        let recorder = Arc::new(Recorder {
            answer,
            prompts: Mutex::new(Vec::new()),
        });
        let resolver = ModelResolver::new(vec![ModelTier::new(
            0,
            recorder.clone(),
            Duration::from_secs(5),
        )])
        .unwrap();
        let config = ApiConfig {
            persona: "Gemini".into(),
            reply_max_chars: 200,
            context_policy: policy,
            search_enabled: search.is_some(),
            ..ApiConfig::default()
        };
        let search = search.map(|s| SearchHandle {
            backend: Arc::new(s),
            max_results: 3,
        });
        let state = AppState::new(
            config,
            Arc::new(ConversationStore::new()),
            Arc::new(resolver),
            search,
        );
        (state, recorder)
    }

    fn hits() -> FixedSearch {
        FixedSearch(Ok(vec![SearchSnippet {
            title: "Forecast".into(),
            link: "https://weather.example".into(),
            snippet: "Rain later".into(),
        }]))
    }

    async fn last_prompt(r: &Recorder) -> String {
        r.prompts.lock().await.last().cloned().unwrap()
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_without_touching_the_store() {
        let (state, rec) = setup(Some("hi"), None, ContextPolicy::SearchWins);
        assert!(matches!(chat(&state, "   ").await, Err(AppError::NoPrompt)));
        assert!(state.store.is_empty());
        assert!(rec.prompts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn first_turn_assigns_a_code_and_stores_the_answer() {
        let (state, _) = setup(Some("Hello!"), None, ContextPolicy::SearchWins);
        let reply = chat(&state, "hi").await.unwrap();

        assert_eq!(reply.text, "Hello!");
        assert_eq!(reply.model, "fake-pro");
        assert_eq!(reply.code.len(), 3);
        assert_eq!(state.store.get(&reply.code).as_deref(), Some("Hello!"));
        assert_eq!(
            reply.format("Gemini"),
            format!("Gemini says, \"Hello!\" #{}", reply.code)
        );
    }

    #[tokio::test]
    async fn known_code_sends_previous_answer_as_context() {
        let (state, rec) = setup(Some("Second"), None, ContextPolicy::SearchWins);
        state.store.put("abc", "First answer");

        let reply = chat(&state, "#abc and then?").await.unwrap();

        assert_eq!(reply.code, "abc");
        assert_eq!(state.store.get("abc").as_deref(), Some("Second"));
        let prompt = last_prompt(&rec).await;
        assert!(prompt.contains("First answer"));
        assert!(prompt.ends_with("Current message: and then?"));
    }

    #[tokio::test]
    async fn unknown_code_behaves_like_no_code() {
        let (state, rec) = setup(Some("Fresh"), None, ContextPolicy::SearchWins);
        let reply = chat(&state, "#zzz hello").await.unwrap();

        let prompt = last_prompt(&rec).await;
        assert!(!prompt.contains("previous reply"));
        assert!(prompt.ends_with("Current message: hello"));
        assert_eq!(state.store.len(), 1);
        assert_eq!(state.store.get(&reply.code).as_deref(), Some("Fresh"));
    }

    #[tokio::test]
    async fn hashtag_word_reaches_the_model() {
        let (state, rec) = setup(Some("Because"), None, ContextPolicy::SearchWins);
        let reply = chat(&state, "#rustlang is great, explain why").await.unwrap();

        let prompt = last_prompt(&rec).await;
        assert!(prompt.ends_with("Current message: #rustlang is great, explain why"));
        assert_ne!(reply.code, "rustlang");
        assert_eq!(state.store.get(&reply.code).as_deref(), Some("Because"));
    }

    #[tokio::test]
    async fn generation_failure_leaves_context_intact() {
        let (state, _) = setup(None, None, ContextPolicy::SearchWins);
        state.store.put("abc", "keep me");

        let err = chat(&state, "#abc again").await.unwrap_err();

        assert!(matches!(err, AppError::Llm(_)));
        assert_eq!(state.store.get("abc").as_deref(), Some("keep me"));
        assert_eq!(state.store.len(), 1);
    }

    #[tokio::test]
    async fn search_results_replace_conversation_by_default() {
        let (state, rec) = setup(Some("Take an umbrella"), Some(hits()), ContextPolicy::SearchWins);
        state.store.put("abc", "old talk");

        let reply = chat(&state, "#abc /search weather today").await.unwrap();

        let prompt = last_prompt(&rec).await;
        assert!(prompt.contains("1. Forecast: Rain later"));
        assert!(!prompt.contains("old talk"));
        assert!(prompt.ends_with("Current message: weather today"));
        assert_eq!(reply.code, "abc");
    }

    #[tokio::test]
    async fn combine_policy_sends_both_contexts() {
        let (state, rec) = setup(Some("ok"), Some(hits()), ContextPolicy::Combine);
        state.store.put("abc", "old talk");

        chat(&state, "#abc /search weather").await.unwrap();

        let prompt = last_prompt(&rec).await;
        let conv = prompt.find("old talk").unwrap();
        let web = prompt.find("Rain later").unwrap();
        assert!(conv < web);
    }

    #[tokio::test]
    async fn search_failure_is_terminal() {
        let (state, rec) = setup(Some("ok"), Some(FixedSearch(Err(()))), ContextPolicy::SearchWins);

        let err = chat(&state, "/search anything").await.unwrap_err();

        assert!(matches!(err, AppError::Search(_)));
        assert!(state.store.is_empty());
        assert!(rec.prompts.lock().await.is_empty());
    }

    #[tokio::test]
    async fn empty_search_query_is_rejected() {
        let (state, _) = setup(Some("ok"), Some(hits()), ContextPolicy::SearchWins);
        assert!(matches!(
            chat(&state, "/search   ").await,
            Err(AppError::NoSearchQuery)
        ));
    }

    #[tokio::test]
    async fn directive_is_plain_text_when_search_is_disabled() {
        let (state, rec) = setup(Some("ok"), None, ContextPolicy::SearchWins);
        chat(&state, "/search rust").await.unwrap();
        assert!(last_prompt(&rec).await.ends_with("Current message: /search rust"));
    }

    #[test]
    fn merge_rules() {
        let c = Some("c".to_string());
        let s = Some("s".to_string());
        assert_eq!(
            merge_context(ContextPolicy::SearchWins, c.clone(), s.clone()),
            vec![PromptContext::Search("s".into())]
        );
        assert_eq!(
            merge_context(ContextPolicy::SearchWins, c.clone(), None),
            vec![PromptContext::Conversation("c".into())]
        );
        assert_eq!(
            merge_context(ContextPolicy::Combine, c, s),
            vec![
                PromptContext::Conversation("c".into()),
                PromptContext::Search("s".into())
            ]
        );
    }
}
