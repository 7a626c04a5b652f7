//! In-memory user service.

use std::sync::Arc;

use tracing::{debug, info};

use super::MemoryMembershipService;
use crate::errors::{DirectoryError, EntityKind, Result};
use crate::identity::User;
use crate::registry::Registry;
use crate::services::UserService;

/// A user service that stores all users in memory.
#[derive(Debug)]
pub struct MemoryUserService {
    users: Arc<Registry<User>>,
    membership: Arc<MemoryMembershipService>,
}

impl MemoryUserService {
    /// Create a user service over `users`, removing deleted users' memberships
    /// from `membership`.
    pub fn new(users: Arc<Registry<User>>, membership: Arc<MemoryMembershipService>) -> Self {
        Self { users, membership }
    }

    /// Number of registered users.
    pub fn count(&self) -> usize {
        self.users.len()
    }
}

impl UserService for MemoryUserService {
    fn find_by_name(&self, name: &str) -> Option<User> {
        self.users.find_by_name(name)
    }

    fn create(&self, user: User) -> Result<()> {
        let name = user.name().to_string();
        self.users.write().insert(user)?;
        debug!(user = %name, "Created user");
        Ok(())
    }

    fn delete(&self, user: &User) -> Result<()> {
        let writer = self.users.write();
        let user = writer
            .get(user.name())
            .ok_or_else(|| DirectoryError::not_found(EntityKind::User, user.name()))?;

        let groups = self.membership.detach_user(&user, || {
            writer.remove(user.name());
        });

        info!(user = %user, former_groups = groups.len(), "Deleted user");
        Ok(())
    }
}
