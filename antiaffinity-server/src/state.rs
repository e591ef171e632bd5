//! Application State
//!
//! Shared state for all HTTP handlers.

use antiaffinity_scheduler::AntiRuleManager;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Rule and score store, shared with the check daemon
    manager: Arc<AntiRuleManager>,
}

impl AppState {
    /// Create state around an existing manager
    pub fn new(manager: Arc<AntiRuleManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<AntiRuleManager> {
        &self.manager
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(AntiRuleManager::new()))
    }
}
