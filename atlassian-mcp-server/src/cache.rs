//! Session-scoped cache shared across tool invocations
//!
//! Remembers the most recently listed projects and the most recently
//! executed JQL query for the lifetime of one server process. Values are
//! copied on the way in and on the way out, so callers never alias the
//! stored data and reads never observe a write in progress.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

/// Identity of one remote project as cached between tool calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectSummary {
    /// Internal project ID assigned by the remote instance
    pub id: String,
    /// Short project key (e.g., "PROJ")
    pub key: String,
    /// Human-readable project name
    pub name: String,
}

/// In-memory session state for one server process.
///
/// Each field is guarded independently, so readers of one field never wait
/// on writers of the other. Locks are held only for the duration of the
/// copy itself. A poisoned lock is recovered rather than surfaced; cache
/// operations have no failure mode.
#[derive(Debug, Default)]
pub struct SessionCache {
    projects: RwLock<Vec<ProjectSummary>>,
    last_query: RwLock<String>,
}

impl SessionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored project list with a copy of `projects`
    pub fn set_projects(&self, projects: &[ProjectSummary]) {
        let mut guard = self
            .projects
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = projects.to_vec();
    }

    /// Return a copy of the most recently stored project list
    pub fn projects(&self) -> Vec<ProjectSummary> {
        self.projects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Record the most recently executed query string
    pub fn set_last_query(&self, query: impl Into<String>) {
        let mut guard = self
            .last_query
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = query.into();
    }

    /// Return the most recently executed query string, empty if none
    pub fn last_query(&self) -> String {
        self.last_query
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
