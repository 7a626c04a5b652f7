//! Directory - Users, Groups and Nested Group Membership
//!
//! An in-process directory that answers "is user U a member of group G",
//! including indirect membership through nested groups:
//! - Registries of users and groups, unique by name
//! - A membership graph of direct user memberships and group nesting
//! - Cycle-safe transitive queries, with cycle-creating edges rejected by default
//! - Concurrent reads alongside serialized writes
//!
//! ## Usage
//!
//! ```
//! use directory::{Directory, DirectoryConfig};
//!
//! let directory = Directory::new(&DirectoryConfig::default());
//! directory.create_user("alice")?;
//! directory.create_group("eng")?;
//! directory.create_group("backend")?;
//! directory.add_group_to_group("backend", "eng")?;
//! directory.add_user_to_group("alice", "backend")?;
//!
//! assert!(directory.is_user_in_group("alice", "eng")?);
//! assert!(directory.users_in_group("eng")?.is_empty());
//! # Ok::<(), directory::DirectoryError>(())
//! ```

pub mod config;
pub mod directory;
pub mod errors;
pub mod graph;
pub mod identity;
pub mod memory;
pub mod registry;
pub mod services;

pub use config::{CyclePolicy, DirectoryConfig};
pub use directory::{Directory, DirectoryStats};
pub use errors::{DirectoryError, EntityKind, Result};
pub use identity::{Group, User};
pub use services::{GroupService, MembershipService, UserService};
