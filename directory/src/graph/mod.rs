//! Membership graph data structures and algorithms
//!
//! - `MembershipGraph`: direct user memberships and group nesting, with
//!   reverse indexes for both
//! - `traversal`: cycle-safe transitive queries over the graph

mod state;
pub mod traversal;

pub use state::{DetachedEdges, MembershipGraph};
pub use traversal::Descendants;
