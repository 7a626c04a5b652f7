//! Identity value types
//!
//! `User` and `Group` are opaque, immutable identifiers. Two values are equal,
//! ordered and hashed purely by name; they carry no other state. Constructing
//! one does not register it anywhere.

use std::fmt;
use std::sync::Arc;

use crate::errors::{DirectoryError, EntityKind, Result};

/// An entity that is identified by a unique name.
pub trait Named: Clone + Eq + std::hash::Hash + Send + Sync + 'static {
    /// The kind reported in errors about this entity.
    const KIND: EntityKind;

    /// The unique name of this entity.
    fn name(&self) -> &str;
}

macro_rules! named_identity {
    ($(#[$doc:meta])* $ty:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $ty {
            name: Arc<str>,
        }

        impl $ty {
            /// Create a new instance with the given name.
            ///
            /// Fails with `InvalidArgument` if the name is empty.
            pub fn new(name: impl AsRef<str>) -> Result<Self> {
                let name = name.as_ref();
                if name.is_empty() {
                    return Err(DirectoryError::invalid_argument(format!(
                        "{} name must not be empty",
                        $kind
                    )));
                }
                Ok(Self { name: name.into() })
            }

            /// The name that identifies this entity.
            pub fn name(&self) -> &str {
                &self.name
            }
        }

        impl Named for $ty {
            const KIND: EntityKind = $kind;

            fn name(&self) -> &str {
                &self.name
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.name)
            }
        }
    };
}

named_identity!(
    /// A user that may or may not belong to any groups.
    User,
    EntityKind::User
);

named_identity!(
    /// A group of users. Groups may be nested inside other groups.
    Group,
    EntityKind::Group
);
