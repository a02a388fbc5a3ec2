use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::error::RemoteError;
use crate::evaluation::{EvaluationContext, EvaluationItem, Plan};

const BULK_EVALUATE_PATH: &str = "/api/v1/evaluate/bulk";

/// Remote batch evaluation of flags for a session context.
#[async_trait]
pub trait RemoteEvaluator: Send + Sync {
    async fn evaluate_bulk(
        &self,
        flag_keys: &[&str],
        context: &EvaluationContext,
    ) -> Result<Vec<EvaluationItem>, RemoteError>;
}

// Wire body for the bulk evaluation endpoint.
//
// The evaluation API targets by user id, so the institute id goes into
// `context.userId` to get institute-level targeting. The real user id and
// plan travel as attributes next to the institute id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkEvaluateRequest<'a> {
    pub flag_keys: &'a [&'a str],
    pub context: RemoteContext<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteContext<'a> {
    pub user_id: &'a str,
    pub attributes: RemoteAttributes<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAttributes<'a> {
    pub institute_id: &'a str,
    pub user_id: &'a str,
    pub plan: Plan,
}

impl<'a> BulkEvaluateRequest<'a> {
    pub fn new(flag_keys: &'a [&'a str], context: &'a EvaluationContext) -> Self {
        Self {
            flag_keys,
            context: RemoteContext {
                user_id: context.institute_id(),
                attributes: RemoteAttributes {
                    institute_id: context.institute_id(),
                    user_id: context.user_id(),
                    plan: context.plan(),
                },
            },
        }
    }
}

/// `RemoteEvaluator` over the feature flag HTTP API.
pub struct HttpEvaluator {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpEvaluator {
    /// `base_url` is expected without a trailing `/api` segment, see `config::normalize_base_url`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl RemoteEvaluator for HttpEvaluator {
    async fn evaluate_bulk(
        &self,
        flag_keys: &[&str],
        context: &EvaluationContext,
    ) -> Result<Vec<EvaluationItem>, RemoteError> {
        let url = format!("{}{}", self.base_url, BULK_EVALUATE_PATH);
        let body = BulkEvaluateRequest::new(flag_keys, context);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message: failure_message(status, &text),
            });
        }

        parse_evaluations(&text)
    }
}

/// Pulls `evaluations` out of a success body. A body that is not JSON, or
/// whose `evaluations` is missing or not a list, yields no evaluations.
pub fn parse_evaluations(body: &str) -> Result<Vec<EvaluationItem>, RemoteError> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Ok(Vec::new());
    };

    match value.get("evaluations") {
        Some(list @ Value::Array(_)) => serde_json::from_value(list.clone())
            .map_err(|e| RemoteError::Decode(e.to_string())),
        _ => Ok(Vec::new()),
    }
}

// Prefer the API's own `message`, then the raw body, then the status text
fn failure_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    from_json
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Feature flag API request failed")
                .to_string()
        })
}

impl std::fmt::Debug for HttpEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEvaluator")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
