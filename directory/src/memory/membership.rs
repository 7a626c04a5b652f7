//! In-memory membership service.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::CyclePolicy;
use crate::errors::{DirectoryError, Result};
use crate::graph::{traversal, DetachedEdges, MembershipGraph};
use crate::identity::{Group, Named, User};
use crate::registry::Registry;
use crate::services::MembershipService;

/// Stores user and group relationships in memory.
///
/// Mutations are serialized by a single writer lock and validate that every
/// referenced entity is registered at the time of the call. Queries never take
/// the writer lock.
///
/// Lock order: a registry writer may call into this service while holding its
/// own lock, but this service never acquires a registry writer lock.
#[derive(Debug)]
pub struct MemoryMembershipService {
    users: Arc<Registry<User>>,
    groups: Arc<Registry<Group>>,
    graph: MembershipGraph,
    write_lock: Mutex<()>,
    cycle_policy: CyclePolicy,
}

impl MemoryMembershipService {
    /// Create a membership service validating against the given registries.
    pub fn new(
        users: Arc<Registry<User>>,
        groups: Arc<Registry<Group>>,
        cycle_policy: CyclePolicy,
    ) -> Self {
        Self {
            users,
            groups,
            graph: MembershipGraph::new(),
            write_lock: Mutex::new(()),
            cycle_policy,
        }
    }

    /// The underlying graph, for statistics and read-only inspection.
    pub fn graph(&self) -> &MembershipGraph {
        &self.graph
    }

    /// The configured cycle policy.
    pub fn cycle_policy(&self) -> CyclePolicy {
        self.cycle_policy
    }

    fn require_user(&self, user: &User) -> Result<()> {
        require_exists(&self.users, user)
    }

    fn require_group(&self, group: &Group) -> Result<()> {
        require_exists(&self.groups, group)
    }

    fn remove_users_locked(&self, group: &Group) -> usize {
        let users = self.graph.users_of(group);
        for user in &users {
            self.graph.remove_user(group, user);
            debug!(user = %user, group = %group, "Removed user from group");
        }
        users.len()
    }

    /// Detach `group` from the graph and run `finalize` before releasing the
    /// writer lock.
    ///
    /// Every direct user is removed one at a time, then every nesting edge in
    /// which the group is parent or child. `finalize` is where the group
    /// registry frees the name, so no concurrent mutation can attach a new
    /// edge to the group between the sweep and its removal.
    pub(crate) fn detach_group<F: FnOnce()>(&self, group: &Group, finalize: F) -> DetachedEdges {
        let _guard = self.write_lock.lock();

        let removed_users = self.remove_users_locked(group);
        let detached = self.graph.detach_group(group);
        finalize();

        debug!(
            group = %group,
            users = removed_users,
            parents = detached.parents.len(),
            children = detached.children.len(),
            "Detached group from membership graph"
        );
        detached
    }

    /// Remove every direct membership of `user` and run `finalize` before
    /// releasing the writer lock.
    pub(crate) fn detach_user<F: FnOnce()>(&self, user: &User, finalize: F) -> Vec<Group> {
        let _guard = self.write_lock.lock();

        let groups = self.graph.groups_of(user);
        for group in &groups {
            self.graph.remove_user(group, user);
            debug!(user = %user, group = %group, "Removed user from group");
        }
        finalize();
        groups
    }
}

fn require_exists<T: Named>(registry: &Registry<T>, entity: &T) -> Result<()> {
    if registry.is_registered(entity) {
        Ok(())
    } else {
        Err(DirectoryError::not_found(T::KIND, entity.name()))
    }
}

impl MembershipService for MemoryMembershipService {
    fn add_user_to_group(&self, user: &User, group: &Group) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.require_user(user)?;
        self.require_group(group)?;

        if self.graph.add_user(group, user) {
            debug!(user = %user, group = %group, "Added user to group");
        }
        Ok(())
    }

    fn remove_user_from_group(&self, user: &User, group: &Group) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.require_user(user)?;
        self.require_group(group)?;

        if self.graph.remove_user(group, user) {
            debug!(user = %user, group = %group, "Removed user from group");
        }
        Ok(())
    }

    fn add_group_to_group(&self, child: &Group, parent: &Group) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.require_group(parent)?;
        self.require_group(child)?;

        if self.cycle_policy == CyclePolicy::Reject
            && traversal::would_create_cycle(&self.graph, child, parent)
        {
            warn!(child = %child, parent = %parent, "Rejected group nesting that would create a cycle");
            return Err(DirectoryError::CycleDetected {
                child: child.name().to_string(),
                parent: parent.name().to_string(),
            });
        }

        if self.graph.add_child(parent, child) {
            debug!(child = %child, parent = %parent, "Added child group to parent group");
        }
        Ok(())
    }

    fn remove_group_from_group(&self, child: &Group, parent: &Group) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.require_group(parent)?;
        self.require_group(child)?;

        if self.graph.remove_child(parent, child) {
            debug!(child = %child, parent = %parent, "Removed child group from parent group");
        }
        Ok(())
    }

    fn is_user_in_group(&self, user: &User, group: &Group) -> Result<bool> {
        self.require_user(user)?;
        self.require_group(group)?;
        Ok(traversal::is_member(&self.graph, user, group))
    }

    fn is_group_in_group(&self, child: &Group, parent: &Group) -> Result<bool> {
        self.require_group(child)?;
        self.require_group(parent)?;
        Ok(traversal::is_descendant(&self.graph, child, parent))
    }

    fn get_users_in_group(&self, group: &Group) -> Result<BTreeSet<User>> {
        self.require_group(group)?;
        let users: BTreeSet<User> = self.graph.users_of(group).into_iter().collect();
        debug!(group = %group, count = users.len(), "Current users in group");
        Ok(users)
    }

    fn remove_all_users_from_group(&self, group: &Group) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.require_group(group)?;

        let removed = self.remove_users_locked(group);
        debug!(group = %group, count = removed, "Removed all users from group");
        Ok(())
    }

    fn get_child_groups(&self, group: &Group) -> Result<BTreeSet<Group>> {
        self.require_group(group)?;
        Ok(self.graph.children_of(group).into_iter().collect())
    }

    fn get_parent_groups(&self, group: &Group) -> Result<BTreeSet<Group>> {
        self.require_group(group)?;
        Ok(self.graph.parents_of(group).into_iter().collect())
    }

    fn get_effective_users(&self, group: &Group) -> Result<BTreeSet<User>> {
        self.require_group(group)?;
        Ok(traversal::effective_users(&self.graph, group))
    }

    fn get_groups_for_user(&self, user: &User) -> Result<BTreeSet<Group>> {
        self.require_user(user)?;
        Ok(self.graph.groups_of(user).into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        users: Arc<Registry<User>>,
        groups: Arc<Registry<Group>>,
        membership: MemoryMembershipService,
    }

    fn fixture(policy: CyclePolicy) -> Fixture {
        let users = Arc::new(Registry::new());
        let groups = Arc::new(Registry::new());
        let membership = MemoryMembershipService::new(users.clone(), groups.clone(), policy);
        Fixture {
            users,
            groups,
            membership,
        }
    }

    impl Fixture {
        fn user(&self, name: &str) -> User {
            let user = User::new(name).unwrap();
            self.users.write().insert(user.clone()).unwrap();
            user
        }

        fn group(&self, name: &str) -> Group {
            let group = Group::new(name).unwrap();
            self.groups.write().insert(group.clone()).unwrap();
            group
        }
    }

    #[test]
    fn test_add_user_is_idempotent() {
        let f = fixture(CyclePolicy::Reject);
        let alice = f.user("alice");
        let eng = f.group("eng");

        f.membership.add_user_to_group(&alice, &eng).unwrap();
        let once = f.membership.get_users_in_group(&eng).unwrap();
        f.membership.add_user_to_group(&alice, &eng).unwrap();
        let twice = f.membership.get_users_in_group(&eng).unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn test_unknown_entities_rejected() {
        let f = fixture(CyclePolicy::Reject);
        let alice = f.user("alice");
        let eng = f.group("eng");
        let ghost = Group::new("ghost").unwrap();
        let bob = User::new("bob").unwrap();

        assert_eq!(
            f.membership.add_user_to_group(&alice, &ghost),
            Err(DirectoryError::not_found(crate::EntityKind::Group, "ghost"))
        );
        assert_eq!(
            f.membership.add_user_to_group(&bob, &eng),
            Err(DirectoryError::not_found(crate::EntityKind::User, "bob"))
        );
        assert!(f.membership.add_group_to_group(&ghost, &eng).is_err());
        assert!(f.membership.is_user_in_group(&bob, &eng).is_err());
        assert_eq!(f.membership.graph().membership_edge_count(), 0);
        assert_eq!(f.membership.graph().nesting_edge_count(), 0);
    }

    #[test]
    fn test_transitive_membership_and_retraction() {
        let f = fixture(CyclePolicy::Reject);
        let alice = f.user("alice");
        let eng = f.group("eng");
        let backend = f.group("backend");
        let frontend = f.group("frontend");

        f.membership.add_group_to_group(&backend, &eng).unwrap();
        f.membership.add_group_to_group(&frontend, &eng).unwrap();
        f.membership.add_user_to_group(&alice, &backend).unwrap();
        f.membership.add_user_to_group(&alice, &frontend).unwrap();
        assert!(f.membership.is_user_in_group(&alice, &eng).unwrap());

        // still a member through frontend
        f.membership.remove_user_from_group(&alice, &backend).unwrap();
        assert!(f.membership.is_user_in_group(&alice, &eng).unwrap());

        f.membership.remove_user_from_group(&alice, &frontend).unwrap();
        assert!(!f.membership.is_user_in_group(&alice, &eng).unwrap());
    }

    #[test]
    fn test_cycle_rejected() {
        let f = fixture(CyclePolicy::Reject);
        let a = f.group("a");
        let b = f.group("b");

        f.membership.add_group_to_group(&a, &b).unwrap();
        let err = f.membership.add_group_to_group(&b, &a).unwrap_err();
        assert!(matches!(err, DirectoryError::CycleDetected { .. }));
        assert!(f.membership.add_group_to_group(&a, &a).is_err());
        assert_eq!(f.membership.graph().nesting_edge_count(), 1);
    }

    #[test]
    fn test_cycle_permitted_queries_terminate() {
        let f = fixture(CyclePolicy::Permit);
        let someone = f.user("someone");
        let a = f.group("a");
        let b = f.group("b");

        f.membership.add_group_to_group(&a, &b).unwrap();
        f.membership.add_group_to_group(&b, &a).unwrap();

        assert!(!f.membership.is_user_in_group(&someone, &a).unwrap());
        assert!(f.membership.is_group_in_group(&a, &a).unwrap());
        assert!(f.membership.get_effective_users(&a).unwrap().is_empty());
    }

    #[test]
    fn test_remove_all_users_from_group() {
        let f = fixture(CyclePolicy::Reject);
        let eng = f.group("eng");
        for name in ["alice", "bob", "carol"] {
            let user = f.user(name);
            f.membership.add_user_to_group(&user, &eng).unwrap();
        }

        f.membership.remove_all_users_from_group(&eng).unwrap();
        assert!(f.membership.get_users_in_group(&eng).unwrap().is_empty());
        assert_eq!(f.membership.graph().membership_edge_count(), 0);
    }

    #[test]
    fn test_detach_group_runs_finalize_and_sweeps() {
        let f = fixture(CyclePolicy::Reject);
        let alice = f.user("alice");
        let eng = f.group("eng");
        let backend = f.group("backend");
        f.membership.add_group_to_group(&backend, &eng).unwrap();
        f.membership.add_user_to_group(&alice, &backend).unwrap();

        let mut finalized = false;
        let detached = f.membership.detach_group(&backend, || finalized = true);

        assert!(finalized);
        assert_eq!(detached.parents, vec![eng.clone()]);
        assert!(f.membership.get_child_groups(&eng).unwrap().is_empty());
        assert!(f.membership.get_groups_for_user(&alice).unwrap().is_empty());
    }
}
