//! Name-addressed directory facade
//!
//! Composes the user, group and membership services. Every operation that
//! names a user or group resolves the name against its registry first and
//! fails with `NotFound` if it is unknown, or `InvalidArgument` if empty.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::DirectoryConfig;
use crate::errors::{DirectoryError, EntityKind, Result};
use crate::identity::{Group, User};
use crate::memory::{MemoryGroupService, MemoryMembershipService, MemoryUserService};
use crate::registry::Registry;
use crate::services::{GroupService, MembershipService, UserService};

/// Point-in-time counts for a directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryStats {
    pub users: usize,
    pub groups: usize,
    /// Direct user → group edges.
    pub memberships: usize,
    /// Parent → child group edges.
    pub nestings: usize,
}

/// A directory of users and groups with nested group membership.
///
/// `Directory` is `Send + Sync`; share it between threads with an `Arc`.
#[derive(Debug)]
pub struct Directory {
    users: MemoryUserService,
    groups: MemoryGroupService,
    membership: Arc<MemoryMembershipService>,
}

impl Directory {
    /// Build an empty directory.
    pub fn new(config: &DirectoryConfig) -> Self {
        let user_registry = Arc::new(Registry::new());
        let group_registry = Arc::new(Registry::new());
        let membership = Arc::new(MemoryMembershipService::new(
            user_registry.clone(),
            group_registry.clone(),
            config.cycle_policy,
        ));

        Self {
            users: MemoryUserService::new(user_registry, membership.clone()),
            groups: MemoryGroupService::new(group_registry, membership.clone()),
            membership,
        }
    }

    /// The underlying user service.
    pub fn user_service(&self) -> &MemoryUserService {
        &self.users
    }

    /// The underlying group service.
    pub fn group_service(&self) -> &MemoryGroupService {
        &self.groups
    }

    /// The underlying membership service.
    pub fn membership_service(&self) -> &MemoryMembershipService {
        &self.membership
    }

    fn resolve_user(&self, name: &str) -> Result<User> {
        if name.is_empty() {
            return Err(DirectoryError::invalid_argument("user name must not be empty"));
        }
        self.users
            .find_by_name(name)
            .ok_or_else(|| DirectoryError::not_found(EntityKind::User, name))
    }

    fn resolve_group(&self, name: &str) -> Result<Group> {
        if name.is_empty() {
            return Err(DirectoryError::invalid_argument("group name must not be empty"));
        }
        self.groups
            .find_by_name(name)
            .ok_or_else(|| DirectoryError::not_found(EntityKind::Group, name))
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    /// Register a new user.
    pub fn create_user(&self, name: &str) -> Result<User> {
        let user = User::new(name)?;
        self.users.create(user.clone())?;
        Ok(user)
    }

    /// Delete a user along with all of its direct memberships.
    pub fn delete_user(&self, name: &str) -> Result<()> {
        let user = self.resolve_user(name)?;
        self.users.delete(&user)
    }

    /// Look up a user by name.
    pub fn find_user(&self, name: &str) -> Option<User> {
        self.users.find_by_name(name)
    }

    // ------------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------------

    /// Register a new group.
    pub fn create_group(&self, name: &str) -> Result<Group> {
        let group = Group::new(name)?;
        self.groups.create(group.clone())?;
        Ok(group)
    }

    /// Delete a group, detaching its users, parents and children first.
    pub fn delete_group(&self, name: &str) -> Result<()> {
        let group = self.resolve_group(name)?;
        self.groups.delete(&group)
    }

    /// Look up a group by name.
    pub fn find_group(&self, name: &str) -> Option<Group> {
        self.groups.find_by_name(name)
    }

    // ------------------------------------------------------------------------
    // Memberships
    // ------------------------------------------------------------------------

    pub fn add_user_to_group(&self, user: &str, group: &str) -> Result<()> {
        let user = self.resolve_user(user)?;
        let group = self.resolve_group(group)?;
        self.membership.add_user_to_group(&user, &group)
    }

    pub fn remove_user_from_group(&self, user: &str, group: &str) -> Result<()> {
        let user = self.resolve_user(user)?;
        let group = self.resolve_group(group)?;
        self.membership.remove_user_from_group(&user, &group)
    }

    /// Nest `child` directly inside `parent`.
    pub fn add_group_to_group(&self, child: &str, parent: &str) -> Result<()> {
        let child = self.resolve_group(child)?;
        let parent = self.resolve_group(parent)?;
        self.membership.add_group_to_group(&child, &parent)
    }

    /// Remove the direct nesting of `child` inside `parent`.
    pub fn remove_group_from_group(&self, child: &str, parent: &str) -> Result<()> {
        let child = self.resolve_group(child)?;
        let parent = self.resolve_group(parent)?;
        self.membership.remove_group_from_group(&child, &parent)
    }

    /// Whether `user` is a member of `group`, directly or through nested groups.
    pub fn is_user_in_group(&self, user: &str, group: &str) -> Result<bool> {
        let user = self.resolve_user(user)?;
        let group = self.resolve_group(group)?;
        self.membership.is_user_in_group(&user, &group)
    }

    /// Whether `child` is nested inside `parent` at any depth.
    pub fn is_group_in_group(&self, child: &str, parent: &str) -> Result<bool> {
        let child = self.resolve_group(child)?;
        let parent = self.resolve_group(parent)?;
        self.membership.is_group_in_group(&child, &parent)
    }

    /// Direct members of `group`.
    pub fn users_in_group(&self, group: &str) -> Result<BTreeSet<User>> {
        let group = self.resolve_group(group)?;
        self.membership.get_users_in_group(&group)
    }

    /// Direct and indirect members of `group`.
    pub fn effective_users_in_group(&self, group: &str) -> Result<BTreeSet<User>> {
        let group = self.resolve_group(group)?;
        self.membership.get_effective_users(&group)
    }

    pub fn remove_all_users_from_group(&self, group: &str) -> Result<()> {
        let group = self.resolve_group(group)?;
        self.membership.remove_all_users_from_group(&group)
    }

    pub fn child_groups(&self, group: &str) -> Result<BTreeSet<Group>> {
        let group = self.resolve_group(group)?;
        self.membership.get_child_groups(&group)
    }

    pub fn parent_groups(&self, group: &str) -> Result<BTreeSet<Group>> {
        let group = self.resolve_group(group)?;
        self.membership.get_parent_groups(&group)
    }

    /// Groups `user` was added to directly.
    pub fn groups_of_user(&self, user: &str) -> Result<BTreeSet<Group>> {
        let user = self.resolve_user(user)?;
        self.membership.get_groups_for_user(&user)
    }

    /// Current entity and edge counts. Not an atomic snapshot.
    pub fn stats(&self) -> DirectoryStats {
        let graph = self.membership.graph();
        DirectoryStats {
            users: self.users.count(),
            groups: self.groups.count(),
            memberships: graph.membership_edge_count(),
            nestings: graph.nesting_edge_count(),
        }
    }
}

impl Default for Directory {
    fn default() -> Self {
        Self::new(&DirectoryConfig::default())
    }
}
