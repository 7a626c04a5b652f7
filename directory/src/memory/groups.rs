//! In-memory group service.

use std::sync::Arc;

use tracing::{debug, info};

use super::MemoryMembershipService;
use crate::errors::{DirectoryError, EntityKind, Result};
use crate::identity::Group;
use crate::registry::Registry;
use crate::services::GroupService;

/// A group service that stores all groups in memory.
#[derive(Debug)]
pub struct MemoryGroupService {
    groups: Arc<Registry<Group>>,
    membership: Arc<MemoryMembershipService>,
}

impl MemoryGroupService {
    /// Create a group service over `groups`, detaching deleted groups from
    /// `membership`.
    pub fn new(groups: Arc<Registry<Group>>, membership: Arc<MemoryMembershipService>) -> Self {
        Self { groups, membership }
    }

    /// Number of registered groups.
    pub fn count(&self) -> usize {
        self.groups.len()
    }

    /// Sorted names of all registered groups.
    pub fn names(&self) -> Vec<String> {
        self.groups.names()
    }
}

impl GroupService for MemoryGroupService {
    fn find_by_name(&self, name: &str) -> Option<Group> {
        self.groups.find_by_name(name)
    }

    fn create(&self, group: Group) -> Result<()> {
        let name = group.name().to_string();
        self.groups.write().insert(group)?;
        debug!(group = %name, "Created group");
        Ok(())
    }

    fn delete(&self, group: &Group) -> Result<()> {
        let writer = self.groups.write();
        let group = writer
            .get(group.name())
            .ok_or_else(|| DirectoryError::not_found(EntityKind::Group, group.name()))?;

        let detached = self.membership.detach_group(&group, || {
            writer.remove(group.name());
        });

        info!(
            group = %group,
            former_parents = detached.parents.len(),
            former_children = detached.children.len(),
            "Deleted group"
        );
        Ok(())
    }
}
