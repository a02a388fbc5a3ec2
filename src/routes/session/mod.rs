pub mod routes;

use serde::Serialize;

use crate::evaluation::{FeatureMap, Plan, Source};

// Query parameters are all optional here so that blank, missing and repeated
// values get the same 400 message instead of an extractor rejection.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SessionQuery {
    pub institute_id: Option<String>,
    pub user_id: Option<String>,
    pub plan: Option<String>,
}

impl SessionQuery {
    /// A parameter counts only when it appears exactly once.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let single = |name: &str| {
            let mut values = pairs.iter().filter(|(key, _)| key == name);
            match (values.next(), values.next()) {
                (Some((_, value)), None) => Some(value.clone()),
                _ => None,
            }
        };

        Self {
            institute_id: single("instituteId"),
            user_id: single("userId"),
            plan: single("plan"),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub institute_id: String,
    pub user_id: String,
    pub plan: Plan,
    pub source: Source,
    pub evaluated_at: String,
    pub features: FeatureMap,
    pub enabled_features: Vec<String>,
    pub disabled_features: Vec<String>,
}

// Comma separated list for the session log lines
pub fn list_or_none(keys: &[String]) -> String {
    if keys.is_empty() {
        "none".to_string()
    } else {
        keys.join(", ")
    }
}
