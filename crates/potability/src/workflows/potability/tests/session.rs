use std::sync::Arc;
use std::time::Duration;

use super::common::*;
use crate::workflows::potability::dataset::{sample_dataset, Dataset};
use crate::workflows::potability::domain::RawFields;
use crate::workflows::potability::publisher::{ClassifyError, InputMode, ResultSource};
use crate::workflows::potability::scoring::{Category, RubricClassifier};
use crate::workflows::potability::session::{SessionError, ValidationSession};

fn session(
    latency: Duration,
) -> (
    Arc<ValidationSession<MemoryPublisher>>,
    Arc<MemoryPublisher>,
) {
    let publisher = Arc::new(MemoryPublisher::default());
    let session = Arc::new(ValidationSession::new(
        Arc::new(RubricClassifier::default()),
        publisher.clone(),
        latency,
    ));
    (session, publisher)
}

#[tokio::test]
async fn successful_run_commits_and_publishes() {
    let (session, publisher) = session(Duration::ZERO);

    let payload = session
        .run(InputMode::manual(reference_fields()))
        .await
        .expect("run succeeds");

    assert_eq!(payload.category, Category::Good);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.form, Some(reference_fields()));
    assert!(snapshot.dataset.is_none());
    assert_eq!(snapshot.last_result, Some(payload));
    assert_eq!(publisher.payloads().len(), 1);
}

#[tokio::test]
async fn failed_run_leaves_previous_state_intact() {
    let (session, publisher) = session(Duration::ZERO);
    session
        .run(InputMode::manual(reference_fields()))
        .await
        .expect("first run succeeds");
    let before = session.snapshot();

    let error = session
        .run(InputMode::manual(RawFields::blank()))
        .await
        .expect_err("blank form fails");

    match error {
        SessionError::Classify(ClassifyError::Validation(validation)) => {
            assert_eq!(validation.violations.len(), 9)
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(session.snapshot(), before);
    assert_eq!(publisher.payloads().len(), 1);

    let retry = session
        .run(InputMode::manual(reference_fields()))
        .await
        .expect("retry succeeds");
    assert_eq!(retry.score, 100.0);
}

#[tokio::test]
async fn empty_dataset_is_rejected() {
    let (session, _) = session(Duration::ZERO);

    let error = session
        .run(InputMode::dataset(Dataset::default()))
        .await
        .expect_err("no rows");

    assert!(matches!(
        error,
        SessionError::Classify(ClassifyError::EmptyDataset)
    ));
    assert_eq!(session.snapshot().last_result, None);
}

#[tokio::test]
async fn newer_run_supersedes_a_pending_one() {
    let (session, publisher) = session(Duration::from_millis(150));

    let stale = tokio::spawn({
        let session = session.clone();
        async move { session.run(InputMode::manual(reference_fields())).await }
    });
    tokio::time::sleep(Duration::from_millis(30)).await;

    let fresh = session
        .run(InputMode::dataset(sample_dataset()))
        .await
        .expect("newest run commits");
    let stale = stale.await.expect("task joins");

    assert!(matches!(stale, Err(SessionError::Superseded)));
    assert!(matches!(fresh.source, ResultSource::Dataset { .. }));
    let snapshot = session.snapshot();
    assert!(snapshot.form.is_none());
    assert_eq!(snapshot.dataset, Some(sample_dataset()));
    assert_eq!(publisher.payloads().len(), 1);
}

#[tokio::test]
async fn abort_cancels_a_pending_run() {
    let (session, publisher) = session(Duration::from_millis(200));

    let pending = tokio::spawn({
        let session = session.clone();
        async move { session.run(InputMode::manual(reference_fields())).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    session.abort();

    let outcome = pending.await.expect("task joins");
    assert!(matches!(outcome, Err(SessionError::Aborted)));
    assert_eq!(session.snapshot().last_result, None);
    assert!(publisher.payloads().is_empty());

    let next = session
        .run(InputMode::manual(reference_fields()))
        .await
        .expect("session usable after abort");
    assert_eq!(next.category, Category::Good);
}

#[tokio::test]
async fn publisher_failure_does_not_commit() {
    let session = ValidationSession::new(
        Arc::new(RubricClassifier::default()),
        Arc::new(OfflinePublisher),
        Duration::ZERO,
    );

    let error = session
        .run(InputMode::manual(reference_fields()))
        .await
        .expect_err("publisher offline");

    assert!(matches!(error, SessionError::Publish(_)));
    assert_eq!(session.snapshot().form, None);
}
