use std::sync::RwLock;

use crate::template::Template;

/// Holds the most recently captured template for the life of the process.
///
/// Writers swap the whole template under the write lock and readers clone it
/// under the read lock, so a reader never sees a partially replaced value.
#[derive(Debug, Default)]
pub struct TemplateStore {
    current: RwLock<Option<Template>>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored template, returning the previous one.
    pub fn replace(&self, template: Template) -> Option<Template> {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.replace(template)
    }

    /// Snapshot of the stored template.
    pub fn current(&self) -> Option<Template> {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_none()
    }
}
