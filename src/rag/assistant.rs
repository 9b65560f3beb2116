//! Question answering over the video index.

use super::context::{build_prompt_with, QueryContext};
use super::references::{extract_video_urls, resolve_references, VideoReference};
use crate::chat::{reply, ChatModel, Conversation, OpenAIChat};
use crate::config::{require_secret, Prompts, RetrievalSettings, Settings, OPENAI_API_KEY_VAR};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, VidqaError};
use crate::vector_index::{PineconeIndex, SearchMatch, VectorIndex};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The outcome of one interaction.
#[derive(Debug, Clone)]
pub struct Answer {
    /// Assistant reply text (markdown).
    pub reply: String,
    /// What was retrieved for the question.
    pub query: QueryContext,
    /// Every URL cited in the reply, in order, duplicates kept.
    pub cited_urls: Vec<String>,
    /// Distinct cited videos with their summaries.
    pub references: Vec<VideoReference>,
}

/// Runs the embed, search, prompt, chat and citation steps for a question.
pub struct Assistant {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chat: Arc<dyn ChatModel>,
    prompts: Prompts,
    retrieval: RetrievalSettings,
}

impl Assistant {
    /// Create an assistant with default prompts and retrieval policy.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        chat: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            embedder,
            index,
            chat,
            prompts: Prompts::default(),
            retrieval: RetrievalSettings::default(),
        }
    }

    /// Build the hosted-service assistant from settings and environment secrets.
    ///
    /// Fails before any network call when a key or the index name is missing.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        require_secret(OPENAI_API_KEY_VAR)?;

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
        let index = Arc::new(PineconeIndex::from_env(&settings.pinecone)?);
        let chat = Arc::new(OpenAIChat::from_settings(&settings.chat)?);

        Ok(Self::new(embedder, index, chat)
            .with_prompts(prompts)
            .with_retrieval(settings.retrieval.clone()))
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Set the retrieval policy.
    pub fn with_retrieval(mut self, retrieval: RetrievalSettings) -> Self {
        self.retrieval = retrieval;
        self
    }

    pub fn retrieval(&self) -> &RetrievalSettings {
        &self.retrieval
    }

    /// A fresh conversation holding the configured system instruction.
    pub fn new_conversation(&self) -> Conversation {
        Conversation::new(self.prompts.assistant.system.clone())
    }

    /// Embed the question and fetch the top matches, unfiltered.
    #[instrument(skip(self), fields(top_k = self.retrieval.top_k))]
    pub async fn retrieve(&self, question: &str) -> Result<Vec<SearchMatch>> {
        let question = validate_question(question)?;

        let vector = self.embedder.embed(question).await?;
        let matches = self
            .index
            .search(&vector, self.retrieval.top_k, true)
            .await?;

        debug!("Retrieved {} matches", matches.len());
        Ok(matches)
    }

    /// Answer a question within an ongoing conversation.
    ///
    /// Appends the prompt and the reply to `conversation`.
    #[instrument(skip(self, conversation), fields(question = %question))]
    pub async fn answer(&self, conversation: &mut Conversation, question: &str) -> Result<Answer> {
        let question = validate_question(question)?;
        info!("Processing question: {}", question);

        let matches = self.retrieve(question).await?;
        let query = QueryContext::new(question, &matches, self.retrieval.score_threshold);
        if !query.has_matches() {
            info!("No matches above {}", self.retrieval.score_threshold);
        }

        let prompt = build_prompt_with(&self.prompts, &query.context_text, question);
        let turn = reply(self.chat.as_ref(), conversation, &prompt).await?;

        let cited_urls = extract_video_urls(&turn.content);
        let references = resolve_references(&cited_urls, &query);
        debug!(
            "Reply cites {} videos ({} distinct)",
            cited_urls.len(),
            references.len()
        );

        Ok(Answer {
            reply: turn.content,
            query,
            cited_urls,
            references,
        })
    }
}

fn validate_question(question: &str) -> Result<&str> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(VidqaError::InvalidInput(
            "Please enter a question before searching.".to_string(),
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ConversationTurn, Role};
    use crate::rag::context::NO_MATCHES_SENTINEL;
    use crate::vector_index::{keys, MemoryIndex, Metadata};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedEmbedder {
        vector: Vec<f32>,
        calls: AtomicUsize,
    }

    impl FixedEmbedder {
        fn new(vector: Vec<f32>) -> Self {
            Self {
                vector,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.vector.clone())
        }

        fn dimensions(&self) -> usize {
            self.vector.len()
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(VidqaError::Embedding("connection refused".to_string()))
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    struct FailingIndex;

    #[async_trait]
    impl VectorIndex for FailingIndex {
        async fn search(
            &self,
            _vector: &[f32],
            _top_k: usize,
            _include_metadata: bool,
        ) -> Result<Vec<SearchMatch>> {
            Err(VidqaError::Search("query failed with status 401 Unauthorized".to_string()))
        }

        async fn delete_all(&self) -> Result<()> {
            Err(VidqaError::Search("unauthorized".to_string()))
        }
    }

    struct RecordingChat {
        reply: String,
        prompts: Mutex<Vec<Vec<ConversationTurn>>>,
    }

    impl RecordingChat {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn last_user_prompt(&self) -> String {
            let seen = self.prompts.lock().unwrap();
            seen.last()
                .and_then(|turns| turns.last())
                .map(|t| t.content.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl ChatModel for RecordingChat {
        async fn complete(&self, turns: &[ConversationTurn]) -> Result<String> {
            self.prompts.lock().unwrap().push(turns.to_vec());
            Ok(self.reply.clone())
        }
    }

    fn invoice_index() -> Arc<MemoryIndex> {
        let index = MemoryIndex::new();
        // cosine with [1, 0, 0] is 0.8
        index
            .upsert(
                "invoice-seg",
                vec![0.8, 0.6, 0.0],
                Metadata::default()
                    .with(keys::VIDEO_NAME, "Invoices-101.mp4")
                    .with(keys::URL, "https://drive.google.com/file/d/inv101/view")
                    .with(keys::TEXT_CONTENT, "Open Billing and click New Invoice.")
                    .with(keys::SUMMARY, "Creating your first invoice")
                    .with(keys::VIDEO_DURATION, 184),
            )
            .unwrap();
        // cosine with [1, 0, 0] is 0.3
        index
            .upsert(
                "weak-seg",
                vec![0.3, 0.0, 0.953_939_2],
                Metadata::default()
                    .with(keys::VIDEO_NAME, "Holiday-Party.mp4")
                    .with(keys::URL, "https://drive.google.com/file/d/party/view")
                    .with(keys::TEXT_CONTENT, "Cake is in the break room."),
            )
            .unwrap();
        Arc::new(index)
    }

    #[tokio::test]
    async fn test_invoice_question_end_to_end() {
        let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0, 0.0]));
        let chat = Arc::new(RecordingChat::new(
            "Go to Billing and choose New Invoice. [VIDEO: https://drive.google.com/file/d/inv101/preview]",
        ));
        let assistant = Assistant::new(embedder.clone(), invoice_index(), chat.clone());
        let mut conversation = assistant.new_conversation();

        let answer = assistant
            .answer(&mut conversation, "How do I create an invoice?")
            .await
            .unwrap();

        // Only the strong match reaches the prompt
        assert_eq!(answer.query.matches.len(), 1);
        assert!((answer.query.matches[0].score - 0.8).abs() < 1e-4);

        let prompt = chat.last_user_prompt();
        assert!(prompt.contains("Video: Invoices 101"));
        assert!(prompt.contains("Content: Open Billing and click New Invoice."));
        assert!(prompt.contains("Link: https://drive.google.com/file/d/inv101/preview"));
        assert!(prompt.contains("How do I create an invoice?"));
        assert!(!prompt.contains("Holiday Party"));

        assert_eq!(
            answer.cited_urls,
            vec!["https://drive.google.com/file/d/inv101/preview"]
        );
        assert_eq!(answer.references.len(), 1);
        assert_eq!(answer.references[0].summary, "Creating your first invoice");

        let roles: Vec<Role> = conversation.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_relevant_matches_still_answers() {
        let embedder = Arc::new(FixedEmbedder::new(vec![0.0, 1.0, 0.0]));
        let chat = Arc::new(RecordingChat::new("From general knowledge: ..."));
        let assistant = Assistant::new(embedder, Arc::new(MemoryIndex::new()), chat.clone());
        let mut conversation = assistant.new_conversation();

        let answer = assistant
            .answer(&mut conversation, "What is double-entry bookkeeping?")
            .await
            .unwrap();

        assert!(!answer.query.has_matches());
        assert!(chat.last_user_prompt().contains(NO_MATCHES_SENTINEL));
        assert!(answer.cited_urls.is_empty());
        assert!(answer.references.is_empty());
    }

    #[tokio::test]
    async fn test_threshold_comes_from_settings() {
        let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0, 0.0]));
        let chat = Arc::new(RecordingChat::new("ok"));
        let assistant = Assistant::new(embedder, invoice_index(), chat).with_retrieval(
            RetrievalSettings {
                top_k: 5,
                score_threshold: 0.2,
            },
        );
        let mut conversation = assistant.new_conversation();

        let answer = assistant.answer(&mut conversation, "party?").await.unwrap();
        assert_eq!(answer.query.matches.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_question_makes_no_calls() {
        let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0, 0.0]));
        let chat = Arc::new(RecordingChat::new("unused"));
        let assistant = Assistant::new(embedder.clone(), invoice_index(), chat.clone());
        let mut conversation = assistant.new_conversation();

        let err = assistant.answer(&mut conversation, "   ").await.unwrap_err();

        assert!(matches!(err, VidqaError::InvalidInput(_)));
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert!(chat.prompts.lock().unwrap().is_empty());
        assert_eq!(conversation.len(), 1);
    }

    #[tokio::test]
    async fn test_embedding_failure_aborts_interaction() {
        let chat = Arc::new(RecordingChat::new("unused"));
        let assistant = Assistant::new(Arc::new(FailingEmbedder), invoice_index(), chat.clone());
        let mut conversation = assistant.new_conversation();

        let err = assistant.answer(&mut conversation, "anything").await.unwrap_err();

        assert!(matches!(err, VidqaError::Embedding(_)));
        assert!(err.is_service_error());
        assert!(chat.prompts.lock().unwrap().is_empty());
        assert_eq!(conversation.len(), 1);
    }

    #[tokio::test]
    async fn test_search_failure_aborts_interaction() {
        let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0, 0.0]));
        let chat = Arc::new(RecordingChat::new("unused"));
        let assistant = Assistant::new(embedder.clone(), Arc::new(FailingIndex), chat.clone());
        let mut conversation = assistant.new_conversation();

        let err = assistant
            .answer(&mut conversation, "How do I create an invoice?")
            .await
            .unwrap_err();

        assert!(matches!(err, VidqaError::Search(_)));
        assert!(err.is_service_error());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
        assert!(chat.prompts.lock().unwrap().is_empty());
        assert_eq!(conversation.len(), 1);
    }

    #[tokio::test]
    async fn test_retrieve_returns_unfiltered_matches() {
        let embedder = Arc::new(FixedEmbedder::new(vec![1.0, 0.0, 0.0]));
        let assistant = Assistant::new(
            embedder,
            invoice_index(),
            Arc::new(RecordingChat::new("unused")),
        );

        let matches = assistant.retrieve("invoice").await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "invoice-seg");
    }
}
