/// Storage tier selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// In-process / shared memory tier.
    Memory,
    /// Durable filesystem tier.
    Filesystem,
}

impl Tier {
    /// Both tiers, memory first.
    pub const ALL: [Tier; 2] = [Tier::Memory, Tier::Filesystem];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Memory => "memory",
            Tier::Filesystem => "filesystem",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-key outcome of a bulk migration.
///
/// Bulk migrations are at-least-once: a crash part-way through leaves some keys copied
/// (and possibly still present in the source) and others untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Keys written to the target tier.
    pub migrated: Vec<String>,
    /// Keys that lapsed or vanished before they could be copied.
    pub skipped: Vec<String>,
    /// Keys whose copy failed, with the error message.
    pub failed: Vec<(String, String)>,
}

impl MigrationReport {
    /// Returns `true` if at least one entry reached the target tier.
    #[inline]
    pub fn succeeded_at_least_one(&self) -> bool {
        !self.migrated.is_empty()
    }

    /// Returns `true` if no key failed.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
