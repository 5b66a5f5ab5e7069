//! Persistence backends for region policies.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use regiontrigger_core::RegionPolicy;

use crate::error::PersistenceError;

/// Trait for policy persistence backends.
///
/// Every call is synchronous; the store only publishes a change after
/// `save` or `delete` has returned `Ok`.
pub trait PolicyBackend: Send + Sync {
    /// Reads every stored policy.
    fn load_all(&self) -> Result<Vec<RegionPolicy>, PersistenceError>;

    /// Inserts or replaces the policy for `policy.region`.
    fn save(&self, policy: &RegionPolicy) -> Result<(), PersistenceError>;

    /// Removes the policy for `region`. Removing an unknown region is not an error.
    fn delete(&self, region: &str) -> Result<(), PersistenceError>;
}

/// In-memory policy backend for testing.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<BTreeMap<String, RegionPolicy>>,
    unavailable: AtomicBool,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with `policies`.
    #[must_use]
    pub fn with_policies(policies: impl IntoIterator<Item = RegionPolicy>) -> Self {
        let backend = Self::new();
        backend.records.write().extend(
            policies
                .into_iter()
                .map(|policy| (policy.region.clone(), policy)),
        );
        backend
    }

    /// Makes every subsequent call fail with [`PersistenceError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// A copy of the stored record for `region`.
    #[must_use]
    pub fn record(&self, region: &str) -> Option<RegionPolicy> {
        self.records.read().get(region).cloned()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn check_available(&self) -> Result<(), PersistenceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(
                "memory backend marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl PolicyBackend for MemoryBackend {
    fn load_all(&self) -> Result<Vec<RegionPolicy>, PersistenceError> {
        self.check_available()?;
        Ok(self.records.read().values().cloned().collect())
    }

    fn save(&self, policy: &RegionPolicy) -> Result<(), PersistenceError> {
        self.check_available()?;
        self.records
            .write()
            .insert(policy.region.clone(), policy.clone());
        Ok(())
    }

    fn delete(&self, region: &str) -> Result<(), PersistenceError> {
        self.check_available()?;
        self.records.write().remove(region);
        Ok(())
    }
}
