//! Chat session: per-session answer cache and transcript.
//!
//! A session owns its embedder, generator, and history. Each question is
//! cached verbatim: asking the exact same string again returns the stored
//! answer without touching the index or either service. History is
//! insert-only and ordered by first ask.

use anyhow::Result;
use std::path::PathBuf;
use uuid::Uuid;

use crate::answer::answer;
use crate::embedding::Embedder;
use crate::generate::Generator;
use crate::index::retrieve;

/// One question/answer pair, recorded the first time the question is asked.
#[derive(Debug, Clone)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

pub struct Session {
    id: Uuid,
    embedder: Box<dyn Embedder>,
    generator: Box<dyn Generator>,
    index_path: PathBuf,
    top_k: usize,
    history: Vec<Turn>,
}

impl Session {
    pub fn new(
        embedder: Box<dyn Embedder>,
        generator: Box<dyn Generator>,
        index_path: PathBuf,
        top_k: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            embedder,
            generator,
            index_path,
            top_k,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Answer a question, consulting the cache first.
    ///
    /// Cache keys are the question string exactly as given; no
    /// normalization, so "What is X?" and "what is x?" are distinct turns.
    /// On a miss the full retrieve-then-generate pipeline runs and the
    /// result is appended to history. Failures leave history unchanged.
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        if let Some(turn) = self.history.iter().find(|t| t.question == question) {
            return Ok(turn.answer.clone());
        }

        let chunks = retrieve(
            self.embedder.as_ref(),
            &self.index_path,
            question,
            self.top_k,
        )
        .await?;
        let texts: Vec<String> = chunks.into_iter().map(|c| c.text).collect();

        let answer = answer(self.generator.as_ref(), question, &texts).await?;

        self.history.push(Turn {
            question: question.to_string(),
            answer: answer.clone(),
        });

        Ok(answer)
    }

    /// All turns in first-asked order.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Render the full conversation for display.
    pub fn render_transcript(&self) -> String {
        let mut out = String::new();
        for turn in &self.history {
            out.push_str(&format!("You: {}\n", turn.question));
            out.push_str(&format!("Assistant: {}\n", turn.answer));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{hash_text, IndexEntry, VectorIndex, FORMAT_VERSION};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedEmbedder {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        fn model_name(&self) -> &str {
            "fixed"
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    struct EchoGenerator {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Generator for EchoGenerator {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("answer #{} to: {}", self.calls.load(Ordering::SeqCst), prompt.len()))
        }
    }

    fn write_tiny_index(path: &std::path::Path) {
        let index = VectorIndex {
            format_version: FORMAT_VERSION,
            model: "fixed".to_string(),
            dims: 2,
            built_at: 0,
            entries: vec![IndexEntry {
                text: "some context".to_string(),
                hash: hash_text("some context"),
                vector: vec![1.0, 0.0],
            }],
        };
        index.save(path).unwrap();
    }

    fn session_with(
        index_path: PathBuf,
        embed_calls: Arc<AtomicUsize>,
        gen_calls: Arc<AtomicUsize>,
    ) -> Session {
        Session::new(
            Box::new(FixedEmbedder { calls: embed_calls }),
            Box::new(EchoGenerator { calls: gen_calls }),
            index_path,
            4,
        )
    }

    #[tokio::test]
    async fn repeated_question_is_served_from_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("index.json");
        write_tiny_index(&path);

        let embed_calls = Arc::new(AtomicUsize::new(0));
        let gen_calls = Arc::new(AtomicUsize::new(0));
        let mut session = session_with(path, embed_calls.clone(), gen_calls.clone());

        let first = session.ask("what is this?").await.unwrap();
        let second = session.ask("what is this?").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(embed_calls.load(Ordering::SeqCst), 1);
        assert_eq!(gen_calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn cache_keys_are_exact_strings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("index.json");
        write_tiny_index(&path);

        let embed_calls = Arc::new(AtomicUsize::new(0));
        let gen_calls = Arc::new(AtomicUsize::new(0));
        let mut session = session_with(path, embed_calls, gen_calls.clone());

        session.ask("What is this?").await.unwrap();
        session.ask("what is this?").await.unwrap();

        assert_eq!(gen_calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn failed_ask_leaves_history_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("absent.json");

        let embed_calls = Arc::new(AtomicUsize::new(0));
        let gen_calls = Arc::new(AtomicUsize::new(0));
        let mut session = session_with(missing, embed_calls.clone(), gen_calls);

        assert!(session.ask("anything").await.is_err());
        assert!(session.history().is_empty());
        // The index check happens before the question is embedded.
        assert_eq!(embed_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transcript_lists_turns_in_first_asked_order() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("index.json");
        write_tiny_index(&path);

        let mut session = session_with(
            path,
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicUsize::new(0)),
        );

        session.ask("first?").await.unwrap();
        session.ask("second?").await.unwrap();
        session.ask("first?").await.unwrap();

        let transcript = session.render_transcript();
        let first_pos = transcript.find("You: first?").unwrap();
        let second_pos = transcript.find("You: second?").unwrap();
        assert!(first_pos < second_pos);
        assert_eq!(transcript.matches("You: first?").count(), 1);
    }
}
