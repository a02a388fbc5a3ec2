use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::SecondsFormat;
use tracing::{info, warn};

use super::{list_or_none, SessionQuery, SessionResponse};
use crate::error::InputError;
use crate::evaluation::{partition, to_feature_map, EvaluationContext, Plan};
use crate::flags::flag_keys;
use crate::state::AppState;

/// Evaluate the known flags for a session
///
/// Only input validation can fail; a failing remote evaluator is answered
/// from the tenant's cached set or the safe defaults.
pub async fn start_session(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<SessionResponse>, InputError> {
    let query = match query {
        Ok(Query(pairs)) => SessionQuery::from_pairs(&pairs),
        Err(rejection) => {
            warn!(error = %rejection, "unreadable session query");
            SessionQuery::default()
        }
    };

    let plan = Plan::parse(query.plan.as_deref());
    let context =
        EvaluationContext::new(query.institute_id.as_deref(), query.user_id.as_deref(), plan)?;

    let evaluation = state.strategy.evaluate(&context, &flag_keys()).await;
    let source = evaluation.source();

    let features = to_feature_map(evaluation.items());
    let (enabled_features, disabled_features) = partition(&features);

    info!(
        institute_id = context.institute_id(),
        user_id = context.user_id(),
        plan = %plan,
        source = %source,
        "session started"
    );
    info!(
        enabled = %list_or_none(&enabled_features),
        disabled = %list_or_none(&disabled_features),
        "session features"
    );

    Ok(Json(SessionResponse {
        institute_id: context.institute_id().to_string(),
        user_id: context.user_id().to_string(),
        plan,
        source,
        evaluated_at: state.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true),
        features,
        enabled_features,
        disabled_features,
    }))
}
