//! End-to-end session tests against an in-process provider.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use std::sync::{Arc, Mutex};
use sutra_core::chat::{AnswerGenerator, ChatError, GenerationError, Speaker};
use sutra_core::provider::{ChatRequest, Provider, ProviderError, Result, TextStream};
use sutra_core::{ChatManager, Config, Document, RagEngine};

/// Replays canned fragments and records every request it receives.
#[derive(Default)]
struct ScriptedProvider {
    fragments: Vec<String>,
    fail_after: Option<String>,
    refuse: bool,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    fn answering(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<TextStream> {
        self.requests.lock().unwrap().push(request);
        if self.refuse {
            return Err(ProviderError::Api {
                status: Some(401),
                message: "Invalid API Key".to_string(),
            });
        }

        let mut items: Vec<Result<String>> = self.fragments.iter().cloned().map(Ok).collect();
        if let Some(message) = &self.fail_after {
            items.push(Err(ProviderError::Other(message.clone())));
        }
        Ok(Box::pin(stream::iter(items)))
    }
}

const PAGES: [&str; 3] = [
    "Sanjaya describes the armies assembled on the field of Kurukshetra.",
    "Krishna said: it is far better to do your duty, even imperfectly, than another's duty perfectly.",
    "The soul is never born and never dies; it is unborn, eternal and primeval.",
];

fn engine() -> RagEngine {
    let document = Document::from_pages("gita.txt", PAGES).unwrap();
    RagEngine::new(document).unwrap()
}

fn manager(provider: Arc<ScriptedProvider>) -> ChatManager {
    ChatManager::new(Config::default(), engine(), provider)
}

#[tokio::test]
async fn duty_question_is_grounded_in_second_page() {
    let provider = Arc::new(ScriptedProvider::answering(&["Do ", "your ", "duty."]));
    let mut manager = manager(Arc::clone(&provider));

    let retrieval = manager.retrieve("What is my duty?");
    assert_eq!(retrieval.top().map(|r| r.page_index), Some(1));

    let answer = manager.query("What is my duty?").await.unwrap();
    assert_eq!(answer, "Do your duty.");

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.messages.len(), 2);
    assert!(request.messages[0].content.contains(PAGES[1]));
    assert_eq!(request.messages[1].content, "What is my duty?");
    assert_eq!(request.model, "deepseek-r1-distill-llama-70b");
    assert_eq!(request.temperature, 0.6);
    assert_eq!(request.max_tokens, 4096);
    assert_eq!(request.top_p, 0.95);
    assert!(request.stream);
}

#[tokio::test]
async fn updates_are_cumulative() {
    let provider = Arc::new(ScriptedProvider::answering(&["The ", "soul ", "is ", "eternal."]));
    let mut manager = manager(provider);

    let mut updates: Vec<String> = Vec::new();
    manager
        .query_stream("Does the soul die?", |partial| updates.push(partial.to_string()))
        .await
        .unwrap();

    assert_eq!(updates.len(), 4);
    for pair in updates.windows(2) {
        assert!(pair[1].len() >= pair[0].len());
        assert!(pair[1].starts_with(&pair[0]));
    }
    assert_eq!(updates.last().map(String::as_str), Some("The soul is eternal."));
}

#[tokio::test]
async fn transcript_records_both_turns() {
    let provider = Arc::new(ScriptedProvider::answering(&["Kurukshetra."]));
    let mut manager = manager(provider);

    manager.query("Where were the armies?").await.unwrap();
    manager.query("Who described them?").await.unwrap();

    let history = manager.history();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].speaker(), Speaker::User);
    assert_eq!(history[0].label(), "You");
    assert_eq!(history[0].message(), "Where were the armies?");
    assert_eq!(history[1].speaker(), Speaker::Assistant);
    assert_eq!(history[1].label(), "Bhagavad Gita");
    assert_eq!(history[1].message(), "Kurukshetra.");
    assert_eq!(history[2].message(), "Who described them?");
}

#[tokio::test]
async fn refused_request_is_a_tagged_error() {
    let provider = Arc::new(ScriptedProvider {
        refuse: true,
        ..Default::default()
    });
    let mut manager = manager(provider);

    let err = manager.query("What is my duty?").await.unwrap_err();
    assert!(matches!(
        err,
        ChatError::Generation(GenerationError::Provider(ProviderError::Api { status: Some(401), .. }))
    ));

    let history = manager.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].speaker(), Speaker::Assistant);
    assert!(history[1].message().starts_with("Error: "));
}

#[tokio::test]
async fn mid_stream_failure_is_a_tagged_error() {
    let provider = Arc::new(ScriptedProvider {
        fragments: vec!["Partial ".to_string()],
        fail_after: Some("connection reset".to_string()),
        ..Default::default()
    });
    let mut manager = manager(provider);

    let mut updates = 0;
    let err = manager
        .query_stream("What is my duty?", |_| updates += 1)
        .await
        .unwrap_err();

    assert_eq!(updates, 1);
    assert!(matches!(
        err,
        ChatError::Generation(GenerationError::Provider(ProviderError::Other(_)))
    ));
}

#[tokio::test]
async fn generator_stream_without_manager() {
    let provider = Arc::new(ScriptedProvider::answering(&["a", "b", "c"]));
    let generator = AnswerGenerator::from_config(provider, &Config::default());

    let answer = generator.generate("q", "ctx").await.unwrap();
    let values: Vec<String> = answer.map(|item| item.unwrap()).collect().await;
    assert_eq!(values, vec!["a", "ab", "abc"]);
}

#[tokio::test]
async fn sessions_share_engine_but_not_history() {
    let engine = engine();
    let provider = Arc::new(ScriptedProvider::answering(&["ok"]));

    let mut first = ChatManager::new(Config::default(), engine.clone(), provider.clone());
    let second = ChatManager::new(Config::default(), engine, provider);

    first.query("What is my duty?").await.unwrap();
    assert_eq!(first.history().len(), 2);
    assert!(second.history().is_empty());
    assert!(Arc::ptr_eq(
        first.engine().vector_space(),
        second.engine().vector_space()
    ));
}

#[test]
fn open_fails_on_missing_document() {
    let mut config = Config::default();
    config.document.path = "does/not/exist.pdf".to_string();
    assert!(matches!(ChatManager::open(config), Err(ChatError::Load(_))));
}

#[test]
fn open_fails_on_stop_word_only_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.txt");
    std::fs::write(&path, "the and of\x0Cit is").unwrap();

    let mut config = Config::default();
    config.document.path = path.display().to_string();
    assert!(matches!(ChatManager::open(config), Err(ChatError::Index(_))));
}
