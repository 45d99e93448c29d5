use serde::{Deserialize, Serialize};

/// Which inline attribute encoding a vault uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeSyntax {
    /// `@key` and `@key(value)`
    #[default]
    Classic,
    /// `[key:: value]`
    Structured,
}

/// Configuration from .tasknote.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TasksConfig {
    pub attribute_syntax: AttributeSyntax,
    /// Folders excluded from the index when `ignore_archived` is on
    pub ignored_folders: Vec<String>,
    pub ignore_archived: bool,
    pub due_date_attribute: String,
    pub completed_date_attribute: String,
    pub priority_attribute: String,
    pub follow_up: FollowUpConfig,
}

impl Default for TasksConfig {
    fn default() -> Self {
        TasksConfig {
            attribute_syntax: AttributeSyntax::Classic,
            ignored_folders: vec!["Archive".to_string()],
            ignore_archived: true,
            due_date_attribute: "due".to_string(),
            completed_date_attribute: "completed".to_string(),
            priority_attribute: "priority".to_string(),
            follow_up: FollowUpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowUpConfig {
    /// Prepended to the source task's text
    pub prefix: String,
    pub copy_priority: bool,
    pub copy_tags: bool,
}

impl Default for FollowUpConfig {
    fn default() -> Self {
        FollowUpConfig {
            prefix: "Follow up: ".to_string(),
            copy_priority: true,
            copy_tags: false,
        }
    }
}
