//! Test doubles shared by the strategy and route tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::client::RemoteEvaluator;
use crate::error::RemoteError;
use crate::evaluation::{EvaluationContext, EvaluationItem};

pub fn item(key: &str, enabled: bool) -> EvaluationItem {
    EvaluationItem {
        flag_key: key.to_string(),
        enabled,
        reason: None,
    }
}

#[derive(Debug, Clone)]
enum Behavior {
    Succeed(Vec<EvaluationItem>),
    FailStatus(u16),
    Hang(Duration),
}

/// `RemoteEvaluator` whose answer is set by the test. Records every call.
#[derive(Debug)]
pub struct ScriptedEvaluator {
    behavior: Mutex<Behavior>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(Vec<String>, EvaluationContext)>>,
}

impl Default for ScriptedEvaluator {
    fn default() -> Self {
        Self {
            behavior: Mutex::new(Behavior::FailStatus(503)),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedEvaluator {
    pub fn succeed(&self, items: Vec<EvaluationItem>) {
        *self.behavior.lock().unwrap() = Behavior::Succeed(items);
    }

    pub fn fail_with_status(&self, status: u16) {
        *self.behavior.lock().unwrap() = Behavior::FailStatus(status);
    }

    pub fn hang_for(&self, duration: Duration) {
        *self.behavior.lock().unwrap() = Behavior::Hang(duration);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(Vec<String>, EvaluationContext)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteEvaluator for ScriptedEvaluator {
    async fn evaluate_bulk(
        &self,
        flag_keys: &[&str],
        context: &EvaluationContext,
    ) -> Result<Vec<EvaluationItem>, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push((
            flag_keys.iter().map(|k| k.to_string()).collect(),
            context.clone(),
        ));

        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            Behavior::Succeed(items) => Ok(items),
            Behavior::FailStatus(status) => Err(RemoteError::Status {
                status,
                message: "scripted failure".to_string(),
            }),
            Behavior::Hang(duration) => {
                tokio::time::sleep(duration).await;
                Ok(Vec::new())
            }
        }
    }
}
