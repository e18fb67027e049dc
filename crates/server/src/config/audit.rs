use serde::Deserialize;

/// Configuration for the audit trail.
///
/// Records are kept in memory, at most `capacity` of them. The oldest
/// records are dropped once the bound is reached.
#[derive(Debug, Deserialize)]
pub struct AuditConfig {
    /// Whether audit recording is enabled.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Maximum number of records retained.
    #[serde(default = "default_audit_capacity")]
    pub capacity: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            capacity: default_audit_capacity(),
        }
    }
}

fn default_audit_enabled() -> bool {
    true
}

fn default_audit_capacity() -> usize {
    100_000
}
