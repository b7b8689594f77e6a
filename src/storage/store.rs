// src/storage/store.rs

//! In-memory package state shared by the workers of one phase.
//!
//! A single store-wide mutex guards the whole map. Holders only touch the
//! map; no I/O and no `.await` happen while the lock is held.

use std::sync::{Mutex, MutexGuard};

use crate::models::{PackageMap, PackageState};

/// Thread-safe map of package name to mirror state.
#[derive(Debug, Default)]
pub struct StateStore {
    packages: Mutex<PackageMap>,
}

impl StateStore {
    pub fn new(packages: PackageMap) -> Self {
        Self {
            packages: Mutex::new(packages),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PackageMap> {
        // A panicking worker cannot leave a half-written entry behind:
        // every update replaces whole fields.
        self.packages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Owned copy of the full map, for persistence.
    pub fn snapshot(&self) -> PackageMap {
        self.lock().clone()
    }

    /// Copy of one package's state.
    pub fn get(&self, name: &str) -> Option<PackageState> {
        self.lock().get(name).cloned()
    }

    /// Names of all tracked packages, in key order.
    pub fn names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Names of packages matching a predicate.
    pub fn names_where(&self, predicate: impl Fn(&PackageState) -> bool) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(_, state)| predicate(state))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Apply `f` to one package under the lock.
    ///
    /// Returns `None` when the package is not tracked; entries are never
    /// created here.
    pub fn update<R>(&self, name: &str, f: impl FnOnce(&mut PackageState) -> R) -> Option<R> {
        self.lock().get_mut(name).map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PackageStatus;
    use std::sync::Arc;

    fn store_with(names: &[&str]) -> StateStore {
        StateStore::new(
            names
                .iter()
                .map(|n| (n.to_string(), PackageState::default()))
                .collect(),
        )
    }

    #[test]
    fn test_update_existing() {
        let store = store_with(&["foo"]);
        let result = store.update("foo", |state| {
            state.status = PackageStatus::Outdated;
            42
        });
        assert_eq!(result, Some(42));
        assert_eq!(store.get("foo").unwrap().status, PackageStatus::Outdated);
    }

    #[test]
    fn test_update_never_creates() {
        let store = store_with(&["foo"]);
        assert!(store.update("bar", |_| ()).is_none());
        assert_eq!(store.snapshot().len(), 1);
        assert!(store.get("bar").is_none());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = store_with(&["foo"]);
        let mut snapshot = store.snapshot();
        snapshot.get_mut("foo").unwrap().status = PackageStatus::Ignore;
        assert_eq!(store.get("foo").unwrap().status, PackageStatus::Unset);
    }

    #[test]
    fn test_names_where() {
        let store = store_with(&["a", "b", "c"]);
        store.update("b", |s| s.status = PackageStatus::Outdated);
        assert_eq!(store.names_where(PackageState::is_outdated), vec!["b"]);
        assert_eq!(store.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_concurrent_updates() {
        let names: Vec<String> = (0..64).map(|i| format!("pkg{i}")).collect();
        let store = Arc::new(StateStore::new(
            names
                .iter()
                .map(|n| (n.clone(), PackageState::default()))
                .collect(),
        ));

        let handles: Vec<_> = names
            .chunks(16)
            .map(|chunk| {
                let store = Arc::clone(&store);
                let chunk = chunk.to_vec();
                std::thread::spawn(move || {
                    for name in chunk {
                        store.update(&name, |s| s.latest_version = Some(name.clone()));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = store.snapshot();
        assert!(
            snapshot
                .iter()
                .all(|(name, s)| s.latest_version.as_deref() == Some(name.as_str()))
        );
    }
}
