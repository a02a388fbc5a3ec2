use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::clock::Clock;
use super::lkg::LkgStore;
use super::{Evaluation, EvaluationContext, EvaluationItem};
use crate::client::RemoteEvaluator;
use crate::error::RemoteError;
use crate::flags::{KNOWN_FLAGS, SAFE_DEFAULT_REASON};

/// Three-tier flag evaluation: live, then last-known-good, then safe defaults.
pub struct EvaluationStrategy {
    evaluator: Arc<dyn RemoteEvaluator>,
    store: Arc<LkgStore>,
    clock: Arc<dyn Clock>,
    max_age: chrono::Duration,
    timeout: Duration,
}

impl EvaluationStrategy {
    pub fn new(
        evaluator: Arc<dyn RemoteEvaluator>,
        store: Arc<LkgStore>,
        clock: Arc<dyn Clock>,
        max_age: chrono::Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            evaluator,
            store,
            clock,
            max_age,
            timeout,
        }
    }

    /// Evaluates `flag_keys` for the context. Never fails: a remote failure
    /// is logged and answered from the cache or the safe defaults.
    pub async fn evaluate(&self, context: &EvaluationContext, flag_keys: &[&str]) -> Evaluation {
        let institute_id = context.institute_id();

        match self.call_remote(context, flag_keys).await {
            Ok(evaluations) => {
                self.store.put(institute_id, evaluations.clone());
                Evaluation::Live(evaluations)
            }
            Err(err) => {
                warn!(institute_id, error = %err, "feature evaluation failed, falling back");
                self.fallback(institute_id)
            }
        }
    }

    // Exactly one attempt, bounded by the timeout
    async fn call_remote(
        &self,
        context: &EvaluationContext,
        flag_keys: &[&str],
    ) -> Result<Vec<EvaluationItem>, RemoteError> {
        tokio::time::timeout(self.timeout, self.evaluator.evaluate_bulk(flag_keys, context))
            .await
            .map_err(|_| RemoteError::Timeout(self.timeout))?
    }

    fn fallback(&self, institute_id: &str) -> Evaluation {
        if let Some(entry) = self.store.get(institute_id) {
            let age = self.clock.now() - entry.timestamp;
            if age <= self.max_age {
                debug!(institute_id, age_ms = age.num_milliseconds(), "serving last-known-good");
                return Evaluation::Stale(entry.evaluations.clone());
            }
            debug!(institute_id, age_ms = age.num_milliseconds(), "last-known-good too old");
        }

        Evaluation::Defaulted(safe_defaults())
    }
}

/// One evaluation per known flag carrying its safe default.
pub fn safe_defaults() -> Vec<EvaluationItem> {
    KNOWN_FLAGS
        .iter()
        .map(|flag| EvaluationItem {
            flag_key: flag.key.to_string(),
            enabled: flag.safe_default,
            reason: Some(SAFE_DEFAULT_REASON.to_string()),
        })
        .collect()
}
