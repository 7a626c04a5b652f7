//! In-memory service implementations
//!
//! The three services share their registries through `Arc`s. The user and
//! group services call into the membership service on deletion while holding
//! their own writer lock; the membership service never calls back.

mod groups;
mod membership;
mod users;

pub use groups::MemoryGroupService;
pub use membership::MemoryMembershipService;
pub use users::MemoryUserService;
