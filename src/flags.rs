/// A flag this service evaluates, with the value served when neither a live
/// nor a cached evaluation is available.
#[derive(Debug, Clone, Copy)]
pub struct KnownFlag {
    pub key: &'static str,
    pub safe_default: bool,
}

pub const KNOWN_FLAGS: &[KnownFlag] = &[
    KnownFlag { key: "focus_tracking", safe_default: false },
    KnownFlag { key: "brain_monitoring_3d", safe_default: false },
    KnownFlag { key: "focus_model_v2", safe_default: false },
];

/// Reason attached to evaluations synthesized from the safe defaults.
pub const SAFE_DEFAULT_REASON: &str = "SAFE_DEFAULT";

pub fn flag_keys() -> Vec<&'static str> {
    KNOWN_FLAGS.iter().map(|flag| flag.key).collect()
}
