pub mod clock;
pub mod features;
pub mod lkg;
pub mod strategy;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::InputError;

pub use features::{partition, to_feature_map, FeatureMap};
pub use strategy::EvaluationStrategy;

// One flag result, as returned by the remote API or synthesized on fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationItem {
    pub flag_key: String,
    #[serde(default, deserialize_with = "truthy")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// The remote API is loosely typed: `null`, numbers and strings are read by
// truthiness rather than failing the whole batch.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Basic,
    Premium,
}

impl Plan {
    /// Only an exact `premium` selects the premium plan; anything else is basic.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("premium") => Plan::Premium,
            _ => Plan::Basic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Basic => "basic",
            Plan::Premium => "premium",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Who a session is evaluated for. Both ids are stored trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationContext {
    institute_id: String,
    user_id: String,
    plan: Plan,
}

impl EvaluationContext {
    pub fn new(
        institute_id: Option<&str>,
        user_id: Option<&str>,
        plan: Plan,
    ) -> Result<Self, InputError> {
        let institute_id = non_blank(institute_id).ok_or(InputError::MissingInstituteId)?;
        let user_id = non_blank(user_id).ok_or(InputError::MissingUserId)?;

        Ok(Self {
            institute_id: institute_id.to_string(),
            user_id: user_id.to_string(),
            plan,
        })
    }

    pub fn institute_id(&self) -> &str {
        &self.institute_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn plan(&self) -> Plan {
        self.plan
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Which tier produced a session's flag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Source {
    #[serde(rename = "live")]
    Live,
    #[serde(rename = "lkg")]
    Lkg,
    #[serde(rename = "default")]
    SafeDefault,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Live => "live",
            Source::Lkg => "lkg",
            Source::SafeDefault => "default",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the evaluation strategy, tagged by tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// Fresh from the remote API, exactly as received.
    Live(Vec<EvaluationItem>),
    /// The tenant's last-known-good set, served because the remote call failed.
    Stale(Vec<EvaluationItem>),
    /// Safe defaults, served when no usable cached set exists.
    Defaulted(Vec<EvaluationItem>),
}

impl Evaluation {
    pub fn source(&self) -> Source {
        match self {
            Evaluation::Live(_) => Source::Live,
            Evaluation::Stale(_) => Source::Lkg,
            Evaluation::Defaulted(_) => Source::SafeDefault,
        }
    }

    pub fn items(&self) -> &[EvaluationItem] {
        match self {
            Evaluation::Live(items) | Evaluation::Stale(items) | Evaluation::Defaulted(items) => {
                items
            }
        }
    }
}
