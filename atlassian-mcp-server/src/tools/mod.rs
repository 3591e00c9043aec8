//! Tools module for the Atlassian MCP Server
//!
//! Contains all the MCP tools that expose Jira and Confluence operations.

pub mod add_attachment;
pub mod add_comment;
pub mod create_issue;
pub mod list_projects;
pub mod list_spaces;
pub mod pages;
pub mod search_issues;
pub mod search_pages;
pub mod transitions;
pub mod update_issue;

pub use add_attachment::*;
pub use add_comment::*;
pub use create_issue::*;
pub use list_projects::*;
pub use list_spaces::*;
pub use pages::*;
pub use search_issues::*;
pub use search_pages::*;
pub use transitions::*;
pub use update_issue::*;
