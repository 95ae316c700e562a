/// Configuration for the selections registry
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Position value stored when no explicit position is supplied.
///
/// Sorts after any realistic explicit position, so unpositioned nodes fall
/// to the end of a child listing and are ordered by name among themselves.
pub const HIDDEN_POSITION: i64 = 999_888_777;

/// Label used for the blank choice of radio/checkbox presentations
pub const DEFAULT_BLANK_CONTENT: &str = "none";

/// Scope within which `system_code` must be unique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CodeUniqueness {
    /// Unique among active (non-archived) nodes; archived nodes never collide
    #[default]
    ActiveOnly,

    /// Unique among nodes with the same `archived_at` value (legacy schema rule)
    SameArchivalState,
}

impl CodeUniqueness {
    /// Whether a node archived at `candidate` collides with one archived at `existing`
    pub fn collides(
        self,
        candidate: Option<DateTime<Utc>>,
        existing: Option<DateTime<Utc>>,
    ) -> bool {
        match self {
            Self::ActiveOnly => candidate.is_none() && existing.is_none(),
            Self::SameArchivalState => candidate == existing,
        }
    }
}

/// Configuration for [`Registry`](crate::services::Registry) and its consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Name of the registry entity type, used in diagnostics and log fields
    pub entity_name: String,

    /// Uniqueness scope for system codes
    pub code_uniqueness: CodeUniqueness,

    /// Blank choice label when a field does not supply `blank_content`
    pub default_blank_content: String,

    /// Capacity of the registry event broadcast channel
    pub event_channel_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            entity_name: "selection".to_string(),
            code_uniqueness: CodeUniqueness::default(),
            default_blank_content: DEFAULT_BLANK_CONTENT.to_string(),
            event_channel_capacity: 128,
        }
    }
}

impl RegistryConfig {
    /// Parse a configuration from JSON; missing keys take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("invalid registry config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.entity_name.trim().is_empty() {
            return Err("entity_name cannot be empty".to_string());
        }

        if self.event_channel_capacity == 0 {
            return Err("event_channel_capacity must be greater than 0".to_string());
        }

        Ok(())
    }
}
