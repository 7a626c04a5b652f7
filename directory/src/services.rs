//! Service interfaces for users, groups and memberships.
//!
//! Implementations are shared between threads, so every method takes `&self`
//! and every service is `Send + Sync`. In-memory implementations live in
//! [`crate::memory`].

use std::collections::BTreeSet;

use crate::errors::Result;
use crate::identity::{Group, User};

/// Registry of known users.
pub trait UserService: Send + Sync {
    /// Look up a user by name. Never fails; unknown or empty names yield `None`.
    fn find_by_name(&self, name: &str) -> Option<User>;

    /// Register a user, failing with `AlreadyExists` if the name is taken.
    fn create(&self, user: User) -> Result<()>;

    /// Remove a user and every direct membership it holds.
    fn delete(&self, user: &User) -> Result<()>;
}

/// Registry of known groups.
pub trait GroupService: Send + Sync {
    /// Look up a group by name. Never fails; unknown or empty names yield `None`.
    fn find_by_name(&self, name: &str) -> Option<Group>;

    /// Register a group, failing with `AlreadyExists` if the name is taken.
    fn create(&self, group: Group) -> Result<()>;

    /// Remove a group after detaching its users, its children and its parents.
    fn delete(&self, group: &Group) -> Result<()>;
}

/// Direct and transitive relationships between users and groups.
///
/// Every operation fails with `NotFound` if a user or group it names is not
/// currently registered. Transitive queries observe the graph entry by entry
/// and are not linearizable with respect to concurrent mutations.
pub trait MembershipService: Send + Sync {
    /// Add `user` directly to `group`. Adding an existing member is a no-op.
    fn add_user_to_group(&self, user: &User, group: &Group) -> Result<()>;

    /// Remove `user` from the direct members of `group`. No-op if absent.
    fn remove_user_from_group(&self, user: &User, group: &Group) -> Result<()>;

    /// Nest `child` directly inside `parent`. Nesting an existing child is a no-op.
    fn add_group_to_group(&self, child: &Group, parent: &Group) -> Result<()>;

    /// Remove the direct nesting of `child` inside `parent`. No-op if absent.
    fn remove_group_from_group(&self, child: &Group, parent: &Group) -> Result<()>;

    /// Whether `user` is a member of `group` directly or through nested groups.
    fn is_user_in_group(&self, user: &User, group: &Group) -> Result<bool>;

    /// Whether `child` is nested inside `parent` at any depth.
    fn is_group_in_group(&self, child: &Group, parent: &Group) -> Result<bool>;

    /// Point-in-time copy of the direct members of `group`.
    fn get_users_in_group(&self, group: &Group) -> Result<BTreeSet<User>>;

    /// Remove every direct member of `group`.
    fn remove_all_users_from_group(&self, group: &Group) -> Result<()>;

    /// Point-in-time copy of the groups nested directly inside `group`.
    fn get_child_groups(&self, group: &Group) -> Result<BTreeSet<Group>>;

    /// Point-in-time copy of the groups `group` is nested directly inside.
    fn get_parent_groups(&self, group: &Group) -> Result<BTreeSet<Group>>;

    /// Every user that belongs to `group` directly or through nested groups.
    fn get_effective_users(&self, group: &Group) -> Result<BTreeSet<User>>;

    /// Point-in-time copy of the groups `user` was added to directly.
    fn get_groups_for_user(&self, user: &User) -> Result<BTreeSet<Group>>;
}
