use std::sync::Arc;

use crate::evaluation::clock::Clock;
use crate::evaluation::lkg::LkgStore;
use crate::evaluation::EvaluationStrategy;

#[derive(Clone)]
pub struct AppState {
    pub strategy: Arc<EvaluationStrategy>,
    pub store: Arc<LkgStore>,
    pub clock: Arc<dyn Clock>,
}
