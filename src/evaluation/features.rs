use std::collections::BTreeMap;

use super::EvaluationItem;
use crate::flags::KNOWN_FLAGS;

/// Flag key to enabled, total over every known flag.
pub type FeatureMap = BTreeMap<String, bool>;

/// Builds a feature map from a possibly sparse evaluation list.
///
/// Later items win for duplicate keys, unknown keys pass through, and every
/// known flag missing from `evaluations` gets its safe default.
pub fn to_feature_map(evaluations: &[EvaluationItem]) -> FeatureMap {
    let mut map = FeatureMap::new();
    for item in evaluations {
        map.insert(item.flag_key.clone(), item.enabled);
    }

    for flag in KNOWN_FLAGS {
        map.entry(flag.key.to_string()).or_insert(flag.safe_default);
    }

    map
}

/// Splits a feature map into (enabled, disabled) key lists, in key order.
pub fn partition(features: &FeatureMap) -> (Vec<String>, Vec<String>) {
    let mut enabled = Vec::new();
    let mut disabled = Vec::new();

    for (key, on) in features {
        if *on {
            enabled.push(key.clone());
        } else {
            disabled.push(key.clone());
        }
    }

    (enabled, disabled)
}
