use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::clock::Clock;
use super::EvaluationItem;

/// Last successful evaluation set for one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LkgEntry {
    pub timestamp: DateTime<Utc>,
    pub evaluations: Vec<EvaluationItem>,
}

/// In-process last-known-good cache keyed by tenant id.
///
/// Entries are replaced whole behind an `Arc`, so a reader holds either the
/// previous entry or the new one, never a mix. The store applies no TTL;
/// callers judge staleness from `LkgEntry::timestamp`.
pub struct LkgStore {
    entries: RwLock<HashMap<String, Arc<LkgEntry>>>,
    clock: Arc<dyn Clock>,
}

impl LkgStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Records `evaluations` for the tenant stamped with the current time,
    /// replacing anything stored before.
    pub fn put(&self, tenant_id: &str, evaluations: Vec<EvaluationItem>) {
        let entry = Arc::new(LkgEntry {
            timestamp: self.clock.now(),
            evaluations,
        });

        // A panic while holding the lock cannot leave a half-written entry,
        // so a poisoned map is still consistent.
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tenant_id.to_string(), entry);
    }

    pub fn get(&self, tenant_id: &str) -> Option<Arc<LkgEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tenant_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::clock::ManualClock;
    use crate::testing::item;
    use chrono::TimeZone;
    use std::thread;

    fn store_with_clock() -> (LkgStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        ));
        (LkgStore::new(clock.clone()), clock)
    }

    #[test]
    fn test_get_absent_tenant() {
        let (store, _) = store_with_clock();
        assert!(store.get("acme").is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_put_stamps_with_clock() {
        let (store, clock) = store_with_clock();
        store.put("acme", vec![item("focus_tracking", true)]);

        let entry = store.get("acme").unwrap();
        assert_eq!(entry.timestamp, clock.now());
        assert_eq!(entry.evaluations, vec![item("focus_tracking", true)]);
    }

    #[test]
    fn test_put_replaces_without_merging() {
        let (store, clock) = store_with_clock();
        store.put(
            "acme",
            vec![item("focus_tracking", true), item("focus_model_v2", true)],
        );

        clock.advance(chrono::Duration::seconds(30));
        store.put("acme", vec![item("brain_monitoring_3d", true)]);

        let entry = store.get("acme").unwrap();
        assert_eq!(entry.timestamp, clock.now());
        assert_eq!(entry.evaluations, vec![item("brain_monitoring_3d", true)]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_tenants_are_independent() {
        let (store, _) = store_with_clock();
        store.put("acme", vec![item("focus_tracking", true)]);
        store.put("globex", vec![]);

        assert_eq!(store.get("acme").unwrap().evaluations.len(), 1);
        assert!(store.get("globex").unwrap().evaluations.is_empty());
        assert!(store.get("initech").is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_concurrent_readers_never_see_torn_entries() {
        let (store, _) = store_with_clock();
        let store = Arc::new(store);
        let keys = ["focus_tracking", "brain_monitoring_3d", "focus_model_v2"];

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..500 {
                        let enabled = (w + i) % 2 == 0;
                        store.put("acme", keys.iter().map(|k| item(k, enabled)).collect());
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        if let Some(entry) = store.get("acme") {
                            assert_eq!(entry.evaluations.len(), 3);
                            let first = entry.evaluations[0].enabled;
                            assert!(entry.evaluations.iter().all(|e| e.enabled == first));
                        }
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }
    }
}
