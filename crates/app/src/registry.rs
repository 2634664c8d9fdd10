//! Device registry: the in-memory set of commissioned devices.
//!
//! The registry owns two things behind a single mutex: the records, kept in
//! insertion order, and the set of node ids that are reserved. A node id is
//! reserved from [`DeviceRegistry::allocate_node_id`] until either the
//! matching record is removed or the reservation is released, which makes
//! allocation atomic with the uniqueness check.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use matterhub_domain::device::DeviceRecord;
use matterhub_domain::error::{ConflictError, MatterHubError, NotFoundError};
use matterhub_domain::id::NodeId;

#[derive(Debug, Default)]
struct RegistryState {
    records: Vec<DeviceRecord>,
    reserved: BTreeSet<NodeId>,
}

/// Thread-safe registry shared through an `Arc`.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    state: Mutex<RegistryState>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserve and return the smallest unused node id, starting at
    /// [`NodeId::FIRST_DEVICE`].
    pub fn allocate_node_id(&self) -> NodeId {
        let mut state = self.lock();
        let mut candidate = NodeId::FIRST_DEVICE;
        // BTreeSet iterates in order, so the first gap is the smallest free id.
        for taken in state.reserved.range(NodeId::FIRST_DEVICE..) {
            if *taken != candidate {
                break;
            }
            candidate = candidate.next();
        }
        state.reserved.insert(candidate);
        candidate
    }

    /// Free a reservation that never became a record.
    ///
    /// Ids still owned by a registered device are left untouched.
    pub fn release_node_id(&self, node_id: NodeId) {
        let mut state = self.lock();
        if !state.records.iter().any(|r| r.node_id == node_id) {
            state.reserved.remove(&node_id);
        }
    }

    /// Add a record, reserving its node id if it was not allocated here.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::DuplicateName`] or
    /// [`ConflictError::DuplicateNodeId`] if either key is already used by
    /// another record, or a validation error for a blank name.
    pub fn insert(&self, record: DeviceRecord) -> Result<DeviceRecord, MatterHubError> {
        record.validate()?;
        let mut state = self.lock();
        if state.records.iter().any(|r| r.name == record.name) {
            return Err(ConflictError::DuplicateName(record.name).into());
        }
        if state.records.iter().any(|r| r.node_id == record.node_id) {
            return Err(ConflictError::DuplicateNodeId(record.node_id).into());
        }
        state.reserved.insert(record.node_id);
        state.records.push(record.clone());
        Ok(record)
    }

    /// Remove the record named `name` and free its node id.
    ///
    /// Removing an unknown name is a no-op returning `None`.
    pub fn remove(&self, name: &str) -> Option<DeviceRecord> {
        let mut state = self.lock();
        let index = state.records.iter().position(|r| r.name == name)?;
        let record = state.records.remove(index);
        state.reserved.remove(&record.node_id);
        Some(record)
    }

    /// Look up a record by name.
    ///
    /// # Errors
    ///
    /// Returns [`MatterHubError::NotFound`] if no device has that name.
    pub fn get(&self, name: &str) -> Result<DeviceRecord, MatterHubError> {
        self.lock()
            .records
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Device",
                    id: name.to_string(),
                }
                .into()
            })
    }

    #[must_use]
    pub fn find_by_node(&self, node_id: NodeId) -> Option<DeviceRecord> {
        self.lock()
            .records
            .iter()
            .find(|r| r.node_id == node_id)
            .cloned()
    }

    /// Snapshot of all records in insertion order.
    #[must_use]
    pub fn list(&self) -> Vec<DeviceRecord> {
        self.lock().records.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Mutate the record addressed by `node_id` in place.
    ///
    /// Returns `false` when no such record exists. The name and node id are
    /// restored after `update` runs so the keys cannot drift.
    pub fn update_by_node(&self, node_id: NodeId, update: impl FnOnce(&mut DeviceRecord)) -> bool {
        let mut state = self.lock();
        let Some(record) = state.records.iter_mut().find(|r| r.node_id == node_id) else {
            return false;
        };
        let name = record.name.clone();
        update(record);
        record.name = name;
        record.node_id = node_id;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matterhub_domain::error::ConflictError;

    fn record(name: &str, node: u64) -> DeviceRecord {
        DeviceRecord::builder()
            .name(name)
            .node_id(NodeId::new(node))
            .network_ssid("Home")
            .build()
            .unwrap()
    }

    #[test]
    fn should_allocate_from_two_upwards() {
        let registry = DeviceRegistry::new();
        assert_eq!(registry.allocate_node_id(), NodeId::new(2));
        assert_eq!(registry.allocate_node_id(), NodeId::new(3));
        assert_eq!(registry.allocate_node_id(), NodeId::new(4));
    }

    #[test]
    fn should_reuse_smallest_free_id_after_release() {
        let registry = DeviceRegistry::new();
        let a = registry.allocate_node_id();
        let _b = registry.allocate_node_id();
        registry.release_node_id(a);
        assert_eq!(registry.allocate_node_id(), a);
    }

    #[test]
    fn should_not_release_id_owned_by_a_record() {
        let registry = DeviceRegistry::new();
        let id = registry.allocate_node_id();
        registry.insert(record("Lamp", id.get())).unwrap();

        registry.release_node_id(id);

        assert_ne!(registry.allocate_node_id(), id);
    }

    #[test]
    fn should_keep_ids_unique_across_allocate_insert_remove() {
        let registry = DeviceRegistry::new();
        let mut names = Vec::new();

        for round in 0..20u64 {
            let id = registry.allocate_node_id();
            let name = format!("Bulb {round}");
            registry.insert(record(&name, id.get())).unwrap();
            names.push(name);
            if round % 3 == 0 {
                let victim = names.remove(0);
                registry.remove(&victim).unwrap();
            }

            let ids: BTreeSet<NodeId> = registry.list().iter().map(|r| r.node_id).collect();
            assert_eq!(ids.len(), registry.len());
            assert!(ids.iter().all(|id| *id >= NodeId::FIRST_DEVICE));
        }
    }

    #[test]
    fn should_reject_duplicate_name() {
        let registry = DeviceRegistry::new();
        registry.insert(record("Lamp", 2)).unwrap();
        let err = registry.insert(record("Lamp", 3)).unwrap_err();
        assert!(matches!(
            err,
            MatterHubError::Conflict(ConflictError::DuplicateName(ref n)) if n == "Lamp"
        ));
    }

    #[test]
    fn should_reject_duplicate_node_id() {
        let registry = DeviceRegistry::new();
        registry.insert(record("Lamp", 2)).unwrap();
        let err = registry.insert(record("Desk", 2)).unwrap_err();
        assert!(matches!(
            err,
            MatterHubError::Conflict(ConflictError::DuplicateNodeId(id)) if id == NodeId::new(2)
        ));
    }

    #[test]
    fn should_list_in_insertion_order() {
        let registry = DeviceRegistry::new();
        registry.insert(record("Zeta", 5)).unwrap();
        registry.insert(record("Alpha", 2)).unwrap();
        let names: Vec<String> = registry.list().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["Zeta", "Alpha"]);
    }

    #[test]
    fn should_treat_removing_unknown_name_as_noop() {
        let registry = DeviceRegistry::new();
        registry.insert(record("Lamp", 2)).unwrap();
        assert!(registry.remove("Ghost").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn should_return_not_found_for_unknown_name() {
        let registry = DeviceRegistry::new();
        let err = registry.get("Ghost").unwrap_err();
        assert!(matches!(err, MatterHubError::NotFound(ref e) if e.id == "Ghost"));
    }

    #[test]
    fn should_update_record_in_place_by_node() {
        let registry = DeviceRegistry::new();
        registry.insert(record("Lamp", 2)).unwrap();

        let updated = registry.update_by_node(NodeId::new(2), |r| {
            r.power_state = true;
            r.level = Some(120);
        });

        assert!(updated);
        let lamp = registry.get("Lamp").unwrap();
        assert!(lamp.power_state);
        assert_eq!(lamp.level, Some(120));
        assert!(!registry.update_by_node(NodeId::new(9), |r| r.power_state = true));
    }

    #[test]
    fn should_allocate_distinct_ids_from_concurrent_threads() {
        let registry = DeviceRegistry::new();

        let ids: Vec<NodeId> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        (0..50)
                            .map(|_| registry.allocate_node_id())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers
                .into_iter()
                .flat_map(|worker| worker.join().unwrap())
                .collect()
        });

        let distinct: BTreeSet<NodeId> = ids.iter().copied().collect();
        assert_eq!(ids.len(), 400);
        assert_eq!(distinct.len(), 400);
        assert_eq!(distinct.first(), Some(&NodeId::new(2)));
        assert_eq!(distinct.last(), Some(&NodeId::new(401)));
    }
}
