//! # Actions
//!
//! Defines the operations that can be guarded inside a module.
//! Not every module supports every action; see [`crate::modules::ModuleRegistry`].

use serde::{Deserialize, Serialize};

/// Actions that can be performed inside a module.
///
/// The variant order is the canonical column order of the permission editor:
/// - **View**: Open the module's pages and read its records
/// - **Create**: Add new records
/// - **Edit**: Modify existing records
/// - **Delete**: Remove records
/// - **Export**: Download records (PDF, spreadsheet)
/// - **Import**: Bulk-load records from a file or sheet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// View/list records.
    View,

    /// Create new records.
    Create,

    /// Edit existing records.
    Edit,

    /// Delete records.
    Delete,

    /// Export records.
    Export,

    /// Import records.
    Import,
}

impl Action {
    /// Every action in canonical order.
    pub const ALL: [Action; 6] = [
        Action::View,
        Action::Create,
        Action::Edit,
        Action::Delete,
        Action::Export,
        Action::Import,
    ];

    /// Get the string representation of the action.
    ///
    /// # Returns
    ///
    /// The snake_case name used in stored permission matrices.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Export => "export",
            Action::Import => "import",
        }
    }

    /// Human-readable label for editor column headers.
    pub fn label(&self) -> &'static str {
        match self {
            Action::View => "View",
            Action::Create => "Create",
            Action::Edit => "Edit",
            Action::Delete => "Delete",
            Action::Export => "Export",
            Action::Import => "Import",
        }
    }

    /// Parse action from its stored name.
    ///
    /// Matching is exact apart from case and surrounding whitespace; stored
    /// matrices use the canonical names only, so no aliases are accepted.
    ///
    /// # Example
    ///
    /// ```
    /// use opsdesk_acl::Action;
    ///
    /// assert_eq!(Action::parse("view"), Some(Action::View));
    /// assert_eq!(Action::parse("EXPORT"), Some(Action::Export));
    /// assert_eq!(Action::parse("read"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "view" => Some(Action::View),
            "create" => Some(Action::Create),
            "edit" => Some(Action::Edit),
            "delete" => Some(Action::Delete),
            "export" => Some(Action::Export),
            "import" => Some(Action::Import),
            _ => None,
        }
    }

    /// Check if this action leaves records untouched.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Action::View | Action::Export)
    }
}

impl Default for Action {
    fn default() -> Self {
        Action::View
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
