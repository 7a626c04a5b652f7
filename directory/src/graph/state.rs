//! In-memory membership graph
//!
//! Holds the two forward relations (group → direct users, parent → direct
//! children) together with their reverse indexes (user → groups, child →
//! parents). Each relation lives in its own concurrent map, so a reader sees a
//! consistent value for every individual entry but not a consistent snapshot
//! of the whole graph.
//!
//! `MembershipGraph` performs no validation. Mutating methods keep forward and
//! reverse indexes in step only when callers serialize them; the membership
//! service does so with its writer lock.

use std::collections::HashSet;
use std::hash::Hash;

use dashmap::DashMap;

use crate::identity::{Group, User};

/// Adjacency sets keyed by node, with empty sets pruned on removal.
type Adjacency<K, V> = DashMap<K, HashSet<V>>;

fn link<K, V>(map: &Adjacency<K, V>, key: &K, value: &V) -> bool
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    map.entry(key.clone()).or_default().insert(value.clone())
}

fn unlink<K, V>(map: &Adjacency<K, V>, key: &K, value: &V) -> bool
where
    K: Eq + Hash,
    V: Eq + Hash,
{
    let removed = match map.get_mut(key) {
        Some(mut set) => set.remove(value),
        None => return false,
    };
    map.remove_if(key, |_, set| set.is_empty());
    removed
}

fn snapshot<K, V>(map: &Adjacency<K, V>, key: &K) -> Vec<V>
where
    K: Eq + Hash,
    V: Clone,
{
    map.get(key)
        .map(|set| set.iter().cloned().collect())
        .unwrap_or_default()
}

fn edge_count<K: Eq + Hash, V>(map: &Adjacency<K, V>) -> usize {
    map.iter().map(|entry| entry.value().len()).sum()
}

/// Edges removed when a group is detached from the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetachedEdges {
    /// Groups that used to contain the detached group.
    pub parents: Vec<Group>,
    /// Groups the detached group used to contain.
    pub children: Vec<Group>,
}

/// The group containment graph and direct user memberships.
#[derive(Debug, Default)]
pub struct MembershipGraph {
    /// group → users added directly to it
    users_by_group: Adjacency<Group, User>,
    /// user → groups it was added to directly
    groups_by_user: Adjacency<User, Group>,
    /// parent → groups nested directly inside it
    children_by_parent: Adjacency<Group, Group>,
    /// child → groups it is nested directly inside
    parents_by_child: Adjacency<Group, Group>,
}

impl MembershipGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Direct user membership
    // ------------------------------------------------------------------------

    /// Record `user` as a direct member of `group`. Returns false if it already was.
    pub fn add_user(&self, group: &Group, user: &User) -> bool {
        let inserted = link(&self.users_by_group, group, user);
        link(&self.groups_by_user, user, group);
        inserted
    }

    /// Drop `user` from the direct members of `group`. Returns false if it was not one.
    pub fn remove_user(&self, group: &Group, user: &User) -> bool {
        let removed = unlink(&self.users_by_group, group, user);
        unlink(&self.groups_by_user, user, group);
        removed
    }

    /// Whether `user` is a direct member of `group`.
    pub fn has_user(&self, group: &Group, user: &User) -> bool {
        self.users_by_group
            .get(group)
            .is_some_and(|users| users.contains(user))
    }

    /// Point-in-time copy of the direct members of `group`.
    pub fn users_of(&self, group: &Group) -> Vec<User> {
        snapshot(&self.users_by_group, group)
    }

    /// Point-in-time copy of the groups `user` was added to directly.
    pub fn groups_of(&self, user: &User) -> Vec<Group> {
        snapshot(&self.groups_by_user, user)
    }

    // ------------------------------------------------------------------------
    // Group nesting
    // ------------------------------------------------------------------------

    /// Nest `child` directly inside `parent`. Returns false if it already was.
    pub fn add_child(&self, parent: &Group, child: &Group) -> bool {
        let inserted = link(&self.children_by_parent, parent, child);
        link(&self.parents_by_child, child, parent);
        inserted
    }

    /// Remove the direct nesting of `child` inside `parent`. Returns false if absent.
    pub fn remove_child(&self, parent: &Group, child: &Group) -> bool {
        let removed = unlink(&self.children_by_parent, parent, child);
        unlink(&self.parents_by_child, child, parent);
        removed
    }

    /// Point-in-time copy of the groups nested directly inside `group`.
    pub fn children_of(&self, group: &Group) -> Vec<Group> {
        snapshot(&self.children_by_parent, group)
    }

    /// Point-in-time copy of the groups `group` is nested directly inside.
    pub fn parents_of(&self, group: &Group) -> Vec<Group> {
        snapshot(&self.parents_by_child, group)
    }

    /// Remove every nesting edge that touches `group`, in both directions.
    ///
    /// Direct user memberships are left alone; callers detach those first so
    /// that each removal can be reported individually.
    pub fn detach_group(&self, group: &Group) -> DetachedEdges {
        let parents = snapshot(&self.parents_by_child, group);
        for parent in &parents {
            self.remove_child(parent, group);
        }

        let children = snapshot(&self.children_by_parent, group);
        for child in &children {
            self.remove_child(group, child);
        }

        DetachedEdges { parents, children }
    }

    // ------------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------------

    /// Number of direct user → group membership edges.
    pub fn membership_edge_count(&self) -> usize {
        edge_count(&self.users_by_group)
    }

    /// Number of parent → child nesting edges.
    pub fn nesting_edge_count(&self) -> usize {
        edge_count(&self.children_by_parent)
    }
}
