//! Dashboard roles
//!
//! Roles select the default permission template of an account. `admin` is
//! special: it bypasses permission checks entirely.

use serde::{Deserialize, Serialize};

/// Role of a dashboard account.
///
/// Names are matched exactly. Anything else, including other spellings of
/// a recognized name (`"ADMIN"`, `" admin "`), is kept verbatim in
/// [`Role::Other`] so it survives a load/save cycle, and resolves through
/// the `user` template.
///
/// # Examples
///
/// ```
/// use opsdesk_acl::Role;
///
/// assert_eq!(Role::from_name("manager"), Role::Manager);
/// assert_eq!(Role::from_name("auditor"), Role::Other("auditor".to_string()));
/// assert!(!Role::from_name("Admin").is_admin());
/// assert!(Role::Admin.is_admin());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Full access, bypasses every permission check
    Admin,

    /// Runs one location; may carry a `location_id`
    Manager,

    /// Read-mostly staff account
    User,

    /// Marketing staff
    Marketing,

    /// Field operations (installs, warehouse, metrology)
    Operational,

    /// Finance and accounting
    Financiar,

    /// Any role name this build does not recognize
    Other(String),
}

impl Role {
    /// Recognized roles in role-picker order.
    pub const KNOWN: [Role; 6] = [
        Role::Admin,
        Role::Manager,
        Role::User,
        Role::Marketing,
        Role::Operational,
        Role::Financiar,
    ];

    /// Parse a recognized role name. Only the stored lowercase spelling matches.
    ///
    /// # Returns
    ///
    /// `Some(Role)` for recognized names, `None` otherwise
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "manager" => Some(Self::Manager),
            "user" => Some(Self::User),
            "marketing" => Some(Self::Marketing),
            "operational" => Some(Self::Operational),
            "financiar" => Some(Self::Financiar),
            _ => None,
        }
    }

    /// Build a role from any stored name, keeping unknown names as [`Role::Other`].
    pub fn from_name(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| Self::Other(s.to_string()))
    }

    /// Get the stored name of the role.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::User => "user",
            Self::Marketing => "marketing",
            Self::Operational => "operational",
            Self::Financiar => "financiar",
            Self::Other(name) => name,
        }
    }

    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Admin => "Administrator",
            Self::Manager => "Manager",
            Self::User => "User",
            Self::Marketing => "Marketing",
            Self::Operational => "Operational",
            Self::Financiar => "Financial",
            Self::Other(name) => name,
        }
    }

    /// Check if this is the admin role.
    ///
    /// Decided on the stored name, so `Other("admin")` built in code agrees
    /// with what it reloads as.
    pub fn is_admin(&self) -> bool {
        self.as_str() == "admin"
    }

    /// Check if this is the manager role.
    pub fn is_manager(&self) -> bool {
        self.as_str() == "manager"
    }

    /// Check if this build recognizes the role.
    pub fn is_known(&self) -> bool {
        Self::parse(self.as_str()).is_some()
    }

    /// The recognized variant for this role's stored name, if any.
    pub fn canonical(&self) -> Option<Self> {
        Self::parse(self.as_str())
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("financiar"), Some(Role::Financiar));
        assert_eq!(Role::parse("FINANCIAR"), None);
        assert_eq!(Role::parse(" admin "), None);
        assert_eq!(Role::parse("auditor"), None);
    }

    #[test]
    fn test_known_roles_round_trip() {
        for role in Role::KNOWN {
            assert!(role.is_known());
            assert_eq!(Role::from_name(role.as_str()), role);
        }
    }

    #[test]
    fn test_unknown_role_is_preserved() {
        let role = Role::from_name("auditor");
        assert_eq!(role, Role::Other("auditor".to_string()));
        assert_eq!(role.as_str(), "auditor");
        assert!(!role.is_known());
        assert!(!role.is_admin());
    }

    #[test]
    fn test_role_serde_as_plain_string() {
        let json = serde_json::to_string(&Role::Operational).unwrap();
        assert_eq!(json, "\"operational\"");

        let role: Role = serde_json::from_str("\"nonexistent-role\"").unwrap();
        assert_eq!(role, Role::Other("nonexistent-role".to_string()));
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"nonexistent-role\"");
    }

    #[test]
    fn test_non_canonical_spellings_are_not_recognized() {
        for name in ["ADMIN", "Admin", " admin ", "admin\n"] {
            let role = Role::from_name(name);
            assert_eq!(role, Role::Other(name.to_string()));
            assert!(!role.is_admin());
            assert!(!role.is_known());
        }

        // Stored spelling survives a load/save cycle.
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"ADMIN\"");
    }

    #[test]
    fn test_other_with_canonical_name_behaves_like_known_role() {
        let role = Role::Other("admin".to_string());
        assert!(role.is_admin());
        assert!(role.is_known());
        assert_eq!(role.canonical(), Some(Role::Admin));
        assert!(Role::Other("manager".to_string()).is_manager());
    }

    #[test]
    fn test_default_role_is_user() {
        assert_eq!(Role::default(), Role::User);
    }
}
