//! Transitive membership resolution
//!
//! Walks the nesting graph breadth-first with an explicit worklist and a
//! visited set. Stack depth stays constant and every group is expanded at most
//! once, so traversal terminates even when the graph contains a cycle.
//!
//! Traversals read the live graph entry by entry. A query that runs while the
//! graph is being mutated may observe some edges of the mutation and not
//! others; results are not linearizable across the whole graph.

use std::collections::{BTreeSet, HashSet, VecDeque};

use super::MembershipGraph;
use crate::identity::{Group, User};

/// Breadth-first iterator over a group and every group nested beneath it.
///
/// Each reachable group is yielded exactly once. Order follows the worklist
/// and is otherwise unspecified.
pub struct Descendants<'a> {
    graph: &'a MembershipGraph,
    visited: HashSet<Group>,
    queue: VecDeque<Group>,
}

impl<'a> Descendants<'a> {
    /// Start at `root`, yielding `root` first.
    pub fn new(graph: &'a MembershipGraph, root: &Group) -> Self {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(root.clone());
        queue.push_back(root.clone());
        Self {
            graph,
            visited,
            queue,
        }
    }

    /// Start at the children of `root`, without yielding `root` itself.
    ///
    /// `root` is still yielded later if it is reachable from one of its own
    /// descendants.
    pub fn below(graph: &'a MembershipGraph, root: &Group) -> Self {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        for child in graph.children_of(root) {
            if visited.insert(child.clone()) {
                queue.push_back(child);
            }
        }
        Self {
            graph,
            visited,
            queue,
        }
    }
}

impl Iterator for Descendants<'_> {
    type Item = Group;

    fn next(&mut self) -> Option<Group> {
        let current = self.queue.pop_front()?;
        for child in self.graph.children_of(&current) {
            if self.visited.insert(child.clone()) {
                self.queue.push_back(child);
            }
        }
        Some(current)
    }
}

/// Whether `user` belongs to `group` directly or through any nested group.
pub fn is_member(graph: &MembershipGraph, user: &User, group: &Group) -> bool {
    Descendants::new(graph, group).any(|g| graph.has_user(&g, user))
}

/// Whether `child` is nested beneath `parent`, at any depth.
pub fn is_descendant(graph: &MembershipGraph, child: &Group, parent: &Group) -> bool {
    Descendants::below(graph, parent).any(|g| &g == child)
}

/// Every user that belongs to `group` directly or through a nested group.
pub fn effective_users(graph: &MembershipGraph, group: &Group) -> BTreeSet<User> {
    Descendants::new(graph, group)
        .flat_map(|g| graph.users_of(&g))
        .collect()
}

/// Whether nesting `child` inside `parent` would close a cycle.
///
/// True if they are the same group or if `parent` is already reachable from
/// `child`.
pub fn would_create_cycle(graph: &MembershipGraph, child: &Group, parent: &Group) -> bool {
    child == parent || is_descendant(graph, parent, child)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str) -> Group {
        Group::new(name).unwrap()
    }

    fn user(name: &str) -> User {
        User::new(name).unwrap()
    }

    #[test]
    fn test_direct_membership() {
        let graph = MembershipGraph::new();
        let eng = group("eng");
        graph.add_user(&eng, &user("alice"));

        assert!(is_member(&graph, &user("alice"), &eng));
        assert!(!is_member(&graph, &user("bob"), &eng));
    }

    #[test]
    fn test_linear_chain() {
        // eng -> backend -> db
        let graph = MembershipGraph::new();
        let eng = group("eng");
        let backend = group("backend");
        let db = group("db");
        graph.add_child(&eng, &backend);
        graph.add_child(&backend, &db);
        graph.add_user(&db, &user("alice"));

        assert!(is_member(&graph, &user("alice"), &eng));
        assert!(is_member(&graph, &user("alice"), &backend));
        assert!(is_descendant(&graph, &db, &eng));
        assert!(!is_descendant(&graph, &eng, &db));
        assert!(!is_descendant(&graph, &eng, &eng));
    }

    #[test]
    fn test_diamond_graph() {
        //     A
        //    / \
        //   B   C
        //    \ /
        //     D
        let graph = MembershipGraph::new();
        let (a, b, c, d) = (group("a"), group("b"), group("c"), group("d"));
        graph.add_child(&a, &b);
        graph.add_child(&a, &c);
        graph.add_child(&b, &d);
        graph.add_child(&c, &d);

        // D should only be visited once
        let visited: Vec<Group> = Descendants::new(&graph, &a).collect();
        assert_eq!(visited.len(), 4);
        assert_eq!(visited[0], a);
    }

    #[test]
    fn test_cycle_handling() {
        // A -> B -> C -> A (cycle)
        let graph = MembershipGraph::new();
        let (a, b, c) = (group("a"), group("b"), group("c"));
        graph.add_child(&a, &b);
        graph.add_child(&b, &c);
        graph.add_child(&c, &a);

        assert!(!is_member(&graph, &user("nobody"), &a));
        assert_eq!(Descendants::new(&graph, &a).count(), 3);
        // Each group is its own descendant through the cycle
        assert!(is_descendant(&graph, &a, &a));
        assert!(would_create_cycle(&graph, &b, &c));
    }

    #[test]
    fn test_would_create_cycle() {
        let graph = MembershipGraph::new();
        let (eng, backend, db) = (group("eng"), group("backend"), group("db"));
        graph.add_child(&eng, &backend);
        graph.add_child(&backend, &db);

        assert!(would_create_cycle(&graph, &eng, &eng));
        assert!(would_create_cycle(&graph, &eng, &db));
        assert!(!would_create_cycle(&graph, &db, &eng));
    }

    #[test]
    fn test_effective_users() {
        let graph = MembershipGraph::new();
        let (eng, backend, frontend) = (group("eng"), group("backend"), group("frontend"));
        graph.add_child(&eng, &backend);
        graph.add_child(&eng, &frontend);
        graph.add_user(&eng, &user("carol"));
        graph.add_user(&backend, &user("alice"));
        graph.add_user(&frontend, &user("bob"));
        graph.add_user(&frontend, &user("alice"));

        let users: Vec<String> = effective_users(&graph, &eng)
            .into_iter()
            .map(|u| u.name().to_string())
            .collect();
        assert_eq!(users, vec!["alice", "bob", "carol"]);
        assert_eq!(effective_users(&graph, &backend).len(), 1);
    }
}
