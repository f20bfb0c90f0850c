use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use super::dataset::Dataset;
use super::domain::RawFields;
use super::publisher::{
    classify, ClassifyError, InputMode, PublishError, ResultPayload, ResultPublisher,
};
use super::scoring::Classifier;

/// Input and outcome of the last successful validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub form: Option<RawFields>,
    pub dataset: Option<Dataset>,
    pub last_result: Option<ResultPayload>,
}

impl SessionSnapshot {
    fn commit(&mut self, mode: InputMode, payload: ResultPayload) {
        match mode {
            InputMode::Manual { fields } => self.form = Some(fields),
            InputMode::Dataset { records } => self.dataset = Some(records),
        }
        self.last_result = Some(payload);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error("validation aborted before completion")]
    Aborted,
    #[error("validation superseded by a newer request")]
    Superseded,
    #[error("session state lock poisoned")]
    StatePoisoned,
}

/// One user's validate-and-score workflow.
///
/// Each [`run`](Self::run) waits out the configured latency before scoring.
/// Only the most recent run may commit: an older run that finishes late, or
/// any run pending when [`abort`](Self::abort) is called, leaves the snapshot
/// untouched. Failed runs never modify the snapshot either.
pub struct ValidationSession<P> {
    classifier: Arc<dyn Classifier>,
    publisher: Arc<P>,
    latency: Duration,
    generation: AtomicU64,
    aborts: watch::Sender<u64>,
    state: Mutex<SessionSnapshot>,
}

impl<P> ValidationSession<P>
where
    P: ResultPublisher + 'static,
{
    pub fn new(classifier: Arc<dyn Classifier>, publisher: Arc<P>, latency: Duration) -> Self {
        let (aborts, _) = watch::channel(0);
        Self {
            classifier,
            publisher,
            latency,
            generation: AtomicU64::new(0),
            aborts,
            state: Mutex::new(SessionSnapshot::default()),
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub async fn run(&self, mode: InputMode) -> Result<ResultPayload, SessionError> {
        let ticket = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let mut aborts = self.aborts.subscribe();
        debug!(ticket, mode = mode.label(), "validation started");

        tokio::select! {
            _ = tokio::time::sleep(self.latency) => {}
            _ = aborts.changed() => {
                debug!(ticket, "validation aborted");
                return Err(SessionError::Aborted);
            }
        }

        let payload = classify(mode.clone(), self.classifier.as_ref())?;

        let mut state = self.state.lock().map_err(|_| SessionError::StatePoisoned)?;
        if self.generation.load(Ordering::Acquire) != ticket {
            warn!(ticket, "discarding stale validation result");
            return Err(SessionError::Superseded);
        }

        self.publisher.publish(&payload)?;
        state.commit(mode, payload.clone());
        Ok(payload)
    }

    /// Cancels any pending run; the next call to [`run`](Self::run) proceeds normally.
    pub fn abort(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.aborts.send_modify(|epoch| *epoch += 1);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        match self.state.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
