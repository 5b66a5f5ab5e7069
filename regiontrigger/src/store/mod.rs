//! Region policy store
//!
//! [`RegionConfigStore`] owns the in-memory policy table and keeps it in
//! step with a [`PolicyBackend`]. The table is published as an immutable
//! [`PolicyTable`] snapshot: readers clone an `Arc` and never observe a
//! half-applied change, while writers (serialized by an internal mutex)
//! build a replacement policy, persist it, and only then swap in a new
//! snapshot.

pub mod backend;
pub mod json;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use regiontrigger_core::{BanKind, EventSet, RegionPolicy};
use tracing::{debug, info, warn};

use crate::error::{PersistenceError, PolicyError};
use crate::host::SpatialIndex;
use crate::observability::metrics;

pub use backend::{MemoryBackend, PolicyBackend};
pub use json::JsonFileBackend;

/// Immutable snapshot of every configured policy, keyed by region name.
pub type PolicyTable = HashMap<String, Arc<RegionPolicy>>;

/// A single ban list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ban {
    /// Tile type id
    Tile(u16),
    /// Projectile type id
    Projectile(u16),
    /// Canonical item name
    Item(String),
}

impl Ban {
    /// Which list this entry belongs to.
    #[must_use]
    pub const fn kind(&self) -> BanKind {
        match self {
            Self::Tile(_) => BanKind::Tile,
            Self::Projectile(_) => BanKind::Projectile,
            Self::Item(_) => BanKind::Item,
        }
    }

    fn insert_into(&self, policy: &mut RegionPolicy) {
        match self {
            Self::Tile(id) => {
                policy.tile_bans.insert(*id);
            }
            Self::Projectile(id) => {
                policy.projectile_bans.insert(*id);
            }
            Self::Item(name) => {
                policy.item_bans.insert(name.clone());
            }
        }
    }

    fn remove_from(&self, policy: &mut RegionPolicy) {
        match self {
            Self::Tile(id) => {
                policy.tile_bans.remove(id);
            }
            Self::Projectile(id) => {
                policy.projectile_bans.remove(id);
            }
            Self::Item(name) => {
                policy
                    .item_bans
                    .retain(|banned| !banned.eq_ignore_ascii_case(name));
            }
        }
    }
}

/// Persisted per-region trigger configuration.
pub struct RegionConfigStore {
    backend: Arc<dyn PolicyBackend>,
    index: Arc<dyn SpatialIndex>,
    table: RwLock<Arc<PolicyTable>>,
    write_lock: Mutex<()>,
}

impl RegionConfigStore {
    /// Creates a store with an empty table. Call [`reload`](Self::reload)
    /// to populate it from the backend.
    #[must_use]
    pub fn new(backend: Arc<dyn PolicyBackend>, index: Arc<dyn SpatialIndex>) -> Self {
        Self {
            backend,
            index,
            table: RwLock::new(Arc::new(PolicyTable::new())),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a store and loads every policy from the backend.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the initial load fails.
    pub fn open(
        backend: Arc<dyn PolicyBackend>,
        index: Arc<dyn SpatialIndex>,
    ) -> Result<Self, PersistenceError> {
        let store = Self::new(backend, index);
        store.reload()?;
        Ok(store)
    }

    /// The current table snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<PolicyTable> {
        Arc::clone(&self.table.read())
    }

    /// The current policy for `region`, if configured.
    #[must_use]
    pub fn get(&self, region: &str) -> Option<Arc<RegionPolicy>> {
        self.table.read().get(region).cloned()
    }

    /// Number of configured regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    /// Whether no region is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    /// Returns the existing policy or creates and persists an empty one.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::RegionNotFound`] for an unknown region or
    /// [`PolicyError::Persistence`] if the new policy cannot be saved.
    pub fn get_or_create(&self, region: &str) -> Result<Arc<RegionPolicy>, PolicyError> {
        self.update(region, |_| {})
    }

    /// Enables every flag in `events`.
    ///
    /// # Errors
    ///
    /// See [`get_or_create`](Self::get_or_create).
    pub fn add_events(&self, region: &str, events: EventSet) -> Result<Arc<RegionPolicy>, PolicyError> {
        self.update(region, |p| p.events = p.events.union(events))
    }

    /// Disables every flag in `events`. Absent flags are ignored.
    ///
    /// # Errors
    ///
    /// See [`get_or_create`](Self::get_or_create).
    pub fn remove_events(
        &self,
        region: &str,
        events: EventSet,
    ) -> Result<Arc<RegionPolicy>, PolicyError> {
        self.update(region, |p| p.events = p.events.difference(events))
    }

    /// Adds an entry to one of the ban lists.
    ///
    /// # Errors
    ///
    /// See [`get_or_create`](Self::get_or_create).
    pub fn add_ban(&self, region: &str, ban: &Ban) -> Result<Arc<RegionPolicy>, PolicyError> {
        self.update(region, |p| ban.insert_into(p))
    }

    /// Removes an entry from one of the ban lists.
    ///
    /// # Errors
    ///
    /// See [`get_or_create`](Self::get_or_create).
    pub fn remove_ban(&self, region: &str, ban: &Ban) -> Result<Arc<RegionPolicy>, PolicyError> {
        self.update(region, |p| ban.remove_from(p))
    }

    /// Sets or clears the enter message.
    ///
    /// # Errors
    ///
    /// See [`get_or_create`](Self::get_or_create).
    pub fn set_enter_message(
        &self,
        region: &str,
        text: Option<String>,
    ) -> Result<Arc<RegionPolicy>, PolicyError> {
        self.update(region, |p| p.enter_message = text)
    }

    /// Sets or clears the leave message.
    ///
    /// # Errors
    ///
    /// See [`get_or_create`](Self::get_or_create).
    pub fn set_leave_message(
        &self,
        region: &str,
        text: Option<String>,
    ) -> Result<Arc<RegionPolicy>, PolicyError> {
        self.update(region, |p| p.leave_message = text)
    }

    /// Sets or clears the ambient message.
    ///
    /// # Errors
    ///
    /// See [`get_or_create`](Self::get_or_create).
    pub fn set_message(
        &self,
        region: &str,
        text: Option<String>,
    ) -> Result<Arc<RegionPolicy>, PolicyError> {
        self.update(region, |p| p.message = text)
    }

    /// Sets the ambient message interval in seconds.
    ///
    /// # Errors
    ///
    /// See [`get_or_create`](Self::get_or_create).
    pub fn set_message_interval(
        &self,
        region: &str,
        seconds: u32,
    ) -> Result<Arc<RegionPolicy>, PolicyError> {
        self.update(region, |p| p.message_interval = seconds)
    }

    /// Sets or clears the temporary group name.
    ///
    /// # Errors
    ///
    /// See [`get_or_create`](Self::get_or_create).
    pub fn set_temp_group(
        &self,
        region: &str,
        group: Option<String>,
    ) -> Result<Arc<RegionPolicy>, PolicyError> {
        self.update(region, |p| p.temp_group = group)
    }

    /// Adds temporary permissions (stored lower-case).
    ///
    /// # Errors
    ///
    /// See [`get_or_create`](Self::get_or_create).
    pub fn add_permissions(
        &self,
        region: &str,
        permissions: &[String],
    ) -> Result<Arc<RegionPolicy>, PolicyError> {
        self.update(region, |p| {
            p.temp_permissions
                .extend(permissions.iter().map(|perm| perm.to_ascii_lowercase()));
        })
    }

    /// Removes temporary permissions.
    ///
    /// # Errors
    ///
    /// See [`get_or_create`](Self::get_or_create).
    pub fn remove_permissions(
        &self,
        region: &str,
        permissions: &[String],
    ) -> Result<Arc<RegionPolicy>, PolicyError> {
        self.update(region, |p| {
            for perm in permissions {
                p.temp_permissions.remove(&perm.to_ascii_lowercase());
            }
        })
    }

    /// Discards the table and re-reads every policy from the backend.
    ///
    /// The replacement table is fully built before it is published.
    /// Policies for regions the spatial index no longer knows are skipped.
    /// On failure the previous table stays in place.
    ///
    /// Returns the number of policies loaded.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the load fails.
    pub fn reload(&self) -> Result<usize, PersistenceError> {
        let _guard = self.write_lock.lock();
        let policies = self.backend.load_all()?;

        let mut table = PolicyTable::with_capacity(policies.len());
        for policy in policies {
            if self.index.region(&policy.region).is_none() {
                warn!(region = %policy.region, "skipping policy for unknown region");
                continue;
            }
            table.insert(policy.region.clone(), Arc::new(policy));
        }

        let count = table.len();
        *self.table.write() = Arc::new(table);
        info!(count, "region policies reloaded");
        Ok(count)
    }

    /// Removes the policy for a region that was deleted from the spatial index.
    ///
    /// Returns whether a policy existed.
    ///
    /// # Errors
    ///
    /// Returns the backend's error; the table is unchanged in that case.
    pub fn delete(&self, region: &str) -> Result<bool, PersistenceError> {
        let _guard = self.write_lock.lock();
        if !self.table.read().contains_key(region) {
            return Ok(false);
        }

        if let Err(e) = self.backend.delete(region) {
            metrics::record_policy_write(false);
            return Err(e);
        }
        metrics::record_policy_write(true);

        self.publish(|table| {
            table.remove(region);
        });
        info!(region, "region policy deleted");
        Ok(true)
    }

    /// Resolves `region` through the spatial index to its canonical name.
    fn canonical_name(&self, region: &str) -> Result<String, PolicyError> {
        self.index
            .region(region)
            .map(|info| info.name)
            .ok_or_else(|| PolicyError::RegionNotFound(region.to_string()))
    }

    /// Builds, persists and publishes a replacement policy.
    fn update<F>(&self, region: &str, mutate: F) -> Result<Arc<RegionPolicy>, PolicyError>
    where
        F: FnOnce(&mut RegionPolicy),
    {
        let name = self.canonical_name(region)?;
        let _guard = self.write_lock.lock();

        let existing = self.get(&name);
        let mut next = existing
            .as_deref()
            .cloned()
            .unwrap_or_else(|| RegionPolicy::new(name.clone()));
        mutate(&mut next);

        if let Some(existing) = existing {
            if *existing == next {
                debug!(region = %name, "policy unchanged; skipping write");
                return Ok(existing);
            }
        }

        if let Err(e) = self.backend.save(&next) {
            metrics::record_policy_write(false);
            tracing::error!(region = %name, error = %e, "failed to persist region policy");
            return Err(e.into());
        }
        metrics::record_policy_write(true);

        let next = Arc::new(next);
        let published = Arc::clone(&next);
        self.publish(move |table| {
            table.insert(name, published);
        });
        Ok(next)
    }

    /// Swaps in a copy of the current table with `edit` applied.
    ///
    /// Callers hold `write_lock`.
    fn publish<F: FnOnce(&mut PolicyTable)>(&self, edit: F) {
        let mut table = self.table.write();
        let mut next = PolicyTable::clone(&table);
        edit(&mut next);
        *table = Arc::new(next);
    }
}

impl std::fmt::Debug for RegionConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionConfigStore")
            .field("regions", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use regiontrigger_core::{Event, RegionInfo, TilePoint};

    use super::*;

    struct FixedIndex(Vec<RegionInfo>);

    impl SpatialIndex for FixedIndex {
        fn regions_at(&self, _point: TilePoint) -> Vec<RegionInfo> {
            self.0.clone()
        }

        fn region(&self, name: &str) -> Option<RegionInfo> {
            self.0.iter().find(|r| r.name == name).cloned()
        }
    }

    fn store_with(backend: Arc<MemoryBackend>) -> RegionConfigStore {
        let index = FixedIndex(vec![
            RegionInfo::new("GreenZone", 1, 0, 100),
            RegionInfo::new("Arena", 2, 0, 400),
        ]);
        RegionConfigStore::new(backend, Arc::new(index))
    }

    fn pvp() -> EventSet {
        [Event::Pvp].into_iter().collect()
    }

    #[test]
    fn unknown_region_is_not_found() {
        let store = store_with(Arc::new(MemoryBackend::new()));
        assert!(matches!(
            store.get_or_create("Nowhere"),
            Err(PolicyError::RegionNotFound(name)) if name == "Nowhere"
        ));
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with(Arc::clone(&backend));
        let first = store.get_or_create("GreenZone").unwrap();
        let second = store.get_or_create("GreenZone").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(backend.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn add_events_twice_keeps_single_flag() {
        let store = store_with(Arc::new(MemoryBackend::new()));
        store.add_events("GreenZone", pvp()).unwrap();
        let policy = store.add_events("GreenZone", pvp()).unwrap();
        assert_eq!(policy.events.len(), 1);
        assert!(policy.has_event(Event::Pvp));
    }

    #[test]
    fn remove_absent_event_is_noop() {
        let store = store_with(Arc::new(MemoryBackend::new()));
        let policy = store.remove_events("GreenZone", pvp()).unwrap();
        assert!(policy.events.is_empty());
    }

    #[test]
    fn ban_round_trip() {
        let store = store_with(Arc::new(MemoryBackend::new()));
        store.add_ban("GreenZone", &Ban::Tile(5)).unwrap();
        assert!(store.get("GreenZone").unwrap().tile_bans.contains(&5));

        store.remove_ban("GreenZone", &Ban::Tile(5)).unwrap();
        assert!(store.get("GreenZone").unwrap().tile_bans.is_empty());
    }

    #[test]
    fn item_ban_removal_ignores_case() {
        let store = store_with(Arc::new(MemoryBackend::new()));
        store
            .add_ban("GreenZone", &Ban::Item("Dirt Rod".to_string()))
            .unwrap();
        let policy = store
            .remove_ban("GreenZone", &Ban::Item("dirt rod".to_string()))
            .unwrap();
        assert!(policy.item_bans.is_empty());
    }

    #[test]
    fn permissions_are_lowercased() {
        let store = store_with(Arc::new(MemoryBackend::new()));
        let policy = store
            .add_permissions("GreenZone", &["TShock.TP.Self".to_string()])
            .unwrap();
        assert!(policy.temp_permissions.contains("tshock.tp.self"));

        let policy = store
            .remove_permissions("GreenZone", &["TSHOCK.tp.SELF".to_string()])
            .unwrap();
        assert!(policy.temp_permissions.is_empty());
    }

    #[test]
    fn persistence_failure_leaves_cache_unchanged() {
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with(Arc::clone(&backend));
        store
            .set_enter_message("GreenZone", Some("hi".to_string()))
            .unwrap();

        backend.set_unavailable(true);
        let result = store.set_enter_message("GreenZone", Some("changed".to_string()));
        assert!(matches!(result, Err(PolicyError::Persistence(_))));
        assert_eq!(
            store.get("GreenZone").unwrap().enter_message.as_deref(),
            Some("hi")
        );

        assert!(store.get_or_create("Arena").is_err());
        assert!(store.get("Arena").is_none());
    }

    #[test]
    fn readers_keep_their_snapshot_across_writes() {
        let store = store_with(Arc::new(MemoryBackend::new()));
        store.get_or_create("GreenZone").unwrap();
        let before = store.snapshot();

        store.add_events("GreenZone", pvp()).unwrap();
        assert!(before["GreenZone"].events.is_empty());
        assert!(store.snapshot()["GreenZone"].has_event(Event::Pvp));
    }

    #[test]
    fn reload_skips_unknown_regions() {
        let backend = Arc::new(MemoryBackend::with_policies([
            RegionPolicy::new("GreenZone"),
            RegionPolicy::new("Deleted"),
        ]));
        let store = store_with(backend);
        assert_eq!(store.reload().unwrap(), 1);
        assert!(store.get("GreenZone").is_some());
        assert!(store.get("Deleted").is_none());
    }

    #[test]
    fn failed_reload_keeps_previous_table() {
        let backend = Arc::new(MemoryBackend::with_policies([RegionPolicy::new("GreenZone")]));
        let store = RegionConfigStore::open(
            Arc::clone(&backend) as Arc<dyn PolicyBackend>,
            Arc::new(FixedIndex(vec![RegionInfo::new("GreenZone", 1, 0, 1)])),
        )
        .unwrap();

        backend.set_unavailable(true);
        assert!(store.reload().is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_removes_policy() {
        let backend = Arc::new(MemoryBackend::new());
        let store = store_with(Arc::clone(&backend));
        store.get_or_create("GreenZone").unwrap();

        assert!(store.delete("GreenZone").unwrap());
        assert!(!store.delete("GreenZone").unwrap());
        assert!(store.get("GreenZone").is_none());
        assert!(backend.is_empty());
    }
}
