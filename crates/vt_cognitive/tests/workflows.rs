use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use vt_cognitive::CompletionService;
use vt_core::{ErrorKind, Interaction, Result, SequentialIdGenerator, UuidIdGenerator, VeritasError};
use vt_durable::{InteractionStore, MemoryInteractionStore, SqliteInteractionStore};
use vt_llm::{AnalysisResult, Responder, Reviewer};

// ── 测试替身 ─────────────────────────────────────────────────────────────────────

struct MockResponder {
    answer: Option<String>,
    calls: AtomicUsize,
}

impl MockResponder {
    fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Some(answer.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            answer: None,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Responder for MockResponder {
    async fn get_completion(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
            .clone()
            .ok_or_else(|| VeritasError::BackendUnavailable("responder down".to_string()))
    }
}

#[derive(Default)]
struct MockReviewer {
    fail_analysis: bool,
    fail_training: bool,
    analyze_calls: AtomicUsize,
    chat_calls: AtomicUsize,
    trained: Mutex<Vec<(String, String, bool, String)>>,
}

impl MockReviewer {
    fn healthy() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn analyze_count(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    fn trained(&self) -> Vec<(String, String, bool, String)> {
        self.trained.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reviewer for MockReviewer {
    async fn simple_chat(&self, message: &str) -> Result<String> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("echo: {message}"))
    }

    async fn analyze_response(&self, _prompt: &str, _answer: &str) -> Result<AnalysisResult> {
        let n = self.analyze_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_analysis {
            return Err(VeritasError::BackendBadResponse {
                status: 500,
                body: "reviewer exploded".to_string(),
            });
        }
        Ok(AnalysisResult {
            analysis: format!("analysis #{n}"),
            is_correct: true,
            feedback: "Response analyzed successfully".to_string(),
        })
    }

    async fn train_model(
        &self,
        prompt: &str,
        answer: &str,
        is_correct: bool,
        feedback: &str,
    ) -> Result<()> {
        self.trained.lock().unwrap().push((
            prompt.to_string(),
            answer.to_string(),
            is_correct,
            feedback.to_string(),
        ));
        if self.fail_training {
            return Err(VeritasError::BackendUnavailable("reviewer down".to_string()));
        }
        Ok(())
    }
}

/// 写入总是失败的存储
#[derive(Default)]
struct ReadOnlyStore {
    inner: MemoryInteractionStore,
}

#[async_trait]
impl InteractionStore for ReadOnlyStore {
    async fn create(&self, _entry: &Interaction) -> Result<()> {
        Err(VeritasError::StoreUnavailable("disk full".to_string()))
    }

    async fn get(&self, id: &str) -> Result<Interaction> {
        self.inner.get(id).await
    }

    async fn update_feedback(&self, id: &str, is_correct: bool, feedback: &str) -> Result<()> {
        self.inner.update_feedback(id, is_correct, feedback).await
    }

    async fn list_unresolved(&self) -> Result<Vec<Interaction>> {
        self.inner.list_unresolved().await
    }
}

fn service(
    responder: Arc<MockResponder>,
    reviewer: Arc<MockReviewer>,
    store: Arc<dyn InteractionStore>,
) -> CompletionService {
    CompletionService::new(responder, reviewer, store, Arc::new(UuidIdGenerator))
}

// ── 补全工作流 ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_completion_persists_interaction() {
    let store = Arc::new(MemoryInteractionStore::new());
    let svc = service(MockResponder::answering("4"), MockReviewer::healthy(), store.clone());

    let outcome = svc.get_completion("2+2=?").await.expect("completion should work");
    assert_eq!(outcome.text, "4");
    assert!(outcome.is_correct);
    assert_eq!(outcome.feedback, "Response analyzed successfully");

    let stored = store.get(&outcome.id).await.unwrap();
    assert_eq!(stored.prompt, "2+2=?");
    assert_eq!(stored.responder_answer, "4");
    assert_eq!(stored.reviewer_notes, "analysis #1");
    assert!(stored.is_correct);
}

#[tokio::test]
async fn test_completion_rejects_blank_prompt_before_backends() {
    let responder = MockResponder::answering("4");
    let store = Arc::new(MemoryInteractionStore::new());
    let svc = service(responder.clone(), MockReviewer::healthy(), store.clone());

    let err = svc.get_completion("  ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(responder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn test_completion_responder_failure() {
    let reviewer = MockReviewer::healthy();
    let store = Arc::new(MemoryInteractionStore::new());
    let svc = service(MockResponder::failing(), reviewer.clone(), store.clone());

    let err = svc.get_completion("hello").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamResponder);
    assert_eq!(err.root_cause().kind(), ErrorKind::BackendUnavailable);
    assert_eq!(reviewer.analyze_count(), 0);
    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn test_completion_reviewer_failure_leaves_no_partial_record() {
    let reviewer = Arc::new(MockReviewer {
        fail_analysis: true,
        ..Default::default()
    });
    let store = Arc::new(MemoryInteractionStore::new());
    let svc = service(MockResponder::answering("4"), reviewer, store.clone());

    let err = svc.get_completion("2+2=?").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamReviewer);
    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn test_completion_persistence_failure() {
    let svc = service(
        MockResponder::answering("4"),
        MockReviewer::healthy(),
        Arc::new(ReadOnlyStore::default()),
    );

    let err = svc.get_completion("2+2=?").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreWrite);
    assert_eq!(err.root_cause().kind(), ErrorKind::StoreUnavailable);
    assert!(err.to_string().contains("disk full"));
}

#[tokio::test]
async fn test_concurrent_completions_get_distinct_ids() {
    let store = Arc::new(MemoryInteractionStore::new());
    let svc = Arc::new(CompletionService::new(
        MockResponder::answering("ok"),
        MockReviewer::healthy(),
        store.clone(),
        Arc::new(SequentialIdGenerator::new("test")),
    ));

    let handles: Vec<_> = (0..200)
        .map(|i| {
            let svc = Arc::clone(&svc);
            tokio::spawn(async move { svc.get_completion(&format!("prompt {i}")).await })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().unwrap().id);
    }
    assert_eq!(ids.len(), 200);
    assert_eq!(store.count().await, 200);
}

// ── 复审工作流 ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_analysis_unknown_id_never_calls_reviewer() {
    let reviewer = MockReviewer::healthy();
    let svc = service(
        MockResponder::answering("4"),
        reviewer.clone(),
        Arc::new(MemoryInteractionStore::new()),
    );

    let err = svc.get_analysis("nonexistent").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(reviewer.analyze_count(), 0);
}

#[tokio::test]
async fn test_analysis_is_fresh_and_not_persisted() {
    let store = Arc::new(MemoryInteractionStore::new());
    let svc = service(MockResponder::answering("4"), MockReviewer::healthy(), store.clone());
    let outcome = svc.get_completion("2+2=?").await.unwrap();

    let analysis = svc.get_analysis(&outcome.id).await.unwrap();
    assert_eq!(analysis, "analysis #2");

    let stored = store.get(&outcome.id).await.unwrap();
    assert_eq!(stored.reviewer_notes, "analysis #1");
}

#[tokio::test]
async fn test_analysis_reviewer_failure_leaves_record_untouched() {
    let store = Arc::new(MemoryInteractionStore::new());
    let seeded = Interaction::new("seed-1", "2+2=?", "4", "first look")
        .with_verdict(true, "Response analyzed successfully");
    store.create(&seeded).await.unwrap();

    let reviewer = Arc::new(MockReviewer {
        fail_analysis: true,
        ..Default::default()
    });
    let svc = service(MockResponder::answering("4"), reviewer.clone(), store.clone());

    let err = svc.get_analysis("seed-1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamReviewer);
    assert_eq!(err.root_cause().kind(), ErrorKind::BackendBadResponse);
    assert_eq!(reviewer.analyze_count(), 1);
    assert_eq!(store.get("seed-1").await.unwrap(), seeded);
}

// ── 反馈工作流 ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_feedback_unknown_id() {
    let reviewer = MockReviewer::healthy();
    let store = Arc::new(MemoryInteractionStore::new());
    let svc = service(MockResponder::answering("4"), reviewer.clone(), store.clone());
    let outcome = svc.get_completion("2+2=?").await.unwrap();

    let err = svc.update_feedback("nonexistent", false, "bad").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(reviewer.trained().is_empty());

    let untouched = store.get(&outcome.id).await.unwrap();
    assert!(untouched.is_correct);
    assert_eq!(untouched.feedback, "Response analyzed successfully");
}

#[tokio::test]
async fn test_feedback_updates_store_and_trains_reviewer() {
    let reviewer = MockReviewer::healthy();
    let store = Arc::new(MemoryInteractionStore::new());
    let svc = service(MockResponder::answering("5"), reviewer.clone(), store.clone());
    let outcome = svc.get_completion("2+2=?").await.unwrap();

    svc.update_feedback(&outcome.id, false, "should be 4").await.unwrap();

    let stored = store.get(&outcome.id).await.unwrap();
    assert!(!stored.is_correct);
    assert_eq!(stored.feedback, "should be 4");
    assert_eq!(
        reviewer.trained(),
        vec![(
            "2+2=?".to_string(),
            "5".to_string(),
            false,
            "should be 4".to_string()
        )]
    );
}

#[tokio::test]
async fn test_feedback_saved_even_when_training_fails() {
    let reviewer = Arc::new(MockReviewer {
        fail_training: true,
        ..Default::default()
    });
    let store = Arc::new(MemoryInteractionStore::new());
    let svc = service(MockResponder::answering("5"), reviewer, store.clone());
    let outcome = svc.get_completion("2+2=?").await.unwrap();

    let err = svc.update_feedback(&outcome.id, false, "wrong").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Training);

    let stored = store.get(&outcome.id).await.unwrap();
    assert!(!stored.is_correct);
    assert_eq!(stored.feedback, "wrong");
}

#[tokio::test]
async fn test_unresolved_listing_tracks_feedback() {
    let store = Arc::new(MemoryInteractionStore::new());
    let svc = service(MockResponder::answering("5"), MockReviewer::healthy(), store);
    let first = svc.get_completion("2+2=?").await.unwrap();
    let second = svc.get_completion("3+3=?").await.unwrap();

    assert!(svc.list_unresolved().await.unwrap().is_empty());

    svc.update_feedback(&first.id, false, "wrong").await.unwrap();
    let unresolved = svc.list_unresolved().await.unwrap();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].id, first.id);
    assert!(unresolved.iter().all(|e| !e.is_correct));

    svc.update_feedback(&first.id, true, "fine after all").await.unwrap();
    svc.update_feedback(&second.id, true, "fine").await.unwrap();
    assert!(svc.list_unresolved().await.unwrap().is_empty());
}

// ── 其它 ─────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_reviewer_passthrough() {
    let reviewer = MockReviewer::healthy();
    let svc = service(
        MockResponder::answering("4"),
        reviewer.clone(),
        Arc::new(MemoryInteractionStore::new()),
    );

    assert_eq!(svc.test_reviewer("ping").await.unwrap(), "echo: ping");
    assert_eq!(reviewer.chat_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_full_cycle_on_sqlite() {
    let store: Arc<dyn InteractionStore> = Arc::new(SqliteInteractionStore::in_memory().await.unwrap());
    let reviewer = MockReviewer::healthy();
    let svc = service(MockResponder::answering("4"), reviewer.clone(), store.clone());

    let outcome = svc.get_completion("2+2=?").await.unwrap();
    let stored = store.get(&outcome.id).await.unwrap();
    assert_eq!(stored.responder_answer, "4");
    assert!(stored.is_correct);

    svc.update_feedback(&outcome.id, false, "needs work").await.unwrap();
    let unresolved = store.list_unresolved().await.unwrap();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].feedback, "needs work");
    assert_eq!(reviewer.trained().len(), 1);

    assert!(svc
        .update_feedback("nonexistent", true, "x")
        .await
        .unwrap_err()
        .is_not_found());
    assert_eq!(reviewer.trained().len(), 1);
}
