//! Directory configuration.

use std::env;

use tracing::warn;

/// How the membership service treats a nesting edge that would close a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePolicy {
    /// Refuse the edge with `CycleDetected`.
    #[default]
    Reject,
    /// Store the edge; transitive queries skip groups they have already seen.
    Permit,
}

impl CyclePolicy {
    /// Parse the cycle policy from `DIRECTORY_CYCLE_POLICY`.
    ///
    /// Valid values: "reject" or "permit" (case-insensitive).
    /// Defaults to "reject" if not set or invalid.
    fn from_env() -> Self {
        match env::var("DIRECTORY_CYCLE_POLICY") {
            Ok(value) => Self::parse(&value).unwrap_or_else(|| {
                warn!(value = %value, "Invalid DIRECTORY_CYCLE_POLICY, defaulting to 'reject'");
                Self::Reject
            }),
            Err(_) => Self::Reject,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "reject" => Some(Self::Reject),
            "permit" | "allow" => Some(Self::Permit),
            _ => None,
        }
    }
}

/// Settings for building a [`Directory`](crate::Directory).
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Cycle handling for group nesting.
    pub cycle_policy: CyclePolicy,

    /// Whether the binary seeds a sample topology on startup.
    pub seed_sample: bool,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            cycle_policy: CyclePolicy::Reject,
            seed_sample: true,
        }
    }
}

impl DirectoryConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DIRECTORY_CYCLE_POLICY`: "reject" or "permit" (default: reject)
    /// - `DIRECTORY_SEED_SAMPLE`: "true" or "false" (default: true)
    pub fn from_env() -> Self {
        let seed_sample = env::var("DIRECTORY_SEED_SAMPLE")
            .ok()
            .and_then(|s| s.trim().parse::<bool>().ok())
            .unwrap_or(true);

        Self {
            cycle_policy: CyclePolicy::from_env(),
            seed_sample,
        }
    }

    /// Override the cycle policy.
    pub fn with_cycle_policy(mut self, cycle_policy: CyclePolicy) -> Self {
        self.cycle_policy = cycle_policy;
        self
    }
}
