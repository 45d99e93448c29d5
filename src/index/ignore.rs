use crate::model::config::TasksConfig;
use crate::model::document::Document;

/// Path-based exclusion of archived folders.
///
/// Only folder containment is checked here. Hosts that also hide documents
/// by metadata do that downstream so ignored tasks can still be shown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IgnorePolicy {
    folders: Vec<String>,
    enabled: bool,
}

impl IgnorePolicy {
    pub fn new(folders: Vec<String>, enabled: bool) -> Self {
        IgnorePolicy { folders, enabled }
    }

    pub fn from_config(config: &TasksConfig) -> Self {
        IgnorePolicy::new(config.ignored_folders.clone(), config.ignore_archived)
    }

    pub fn is_ignored(&self, document: &dyn Document) -> bool {
        self.enabled && self.folders.iter().any(|f| document.is_in_folder(f))
    }
}
