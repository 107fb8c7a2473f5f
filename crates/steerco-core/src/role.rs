//! Privilege roles — a total order from viewer up to admin.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Caller privilege level. The derived `Ord` is the role hierarchy:
/// `Viewer < Editor < Admin`, so a role is sufficient for any role it
/// compares greater than or equal to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Editor,
    Admin,
}

impl Role {
    /// Whether a caller holding `self` may act where `required` is the
    /// minimum. Reflexive and transitive by construction.
    pub fn can_act_as(self, required: Role) -> bool {
        self >= required
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role string that is not one of admin/editor/viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_is_reflexive() {
        for role in [Role::Viewer, Role::Editor, Role::Admin] {
            assert!(role.can_act_as(role));
        }
    }

    #[test]
    fn test_hierarchy_is_total_and_transitive() {
        assert!(Role::Admin.can_act_as(Role::Editor));
        assert!(Role::Admin.can_act_as(Role::Viewer));
        assert!(Role::Editor.can_act_as(Role::Viewer));

        assert!(!Role::Viewer.can_act_as(Role::Editor));
        assert!(!Role::Viewer.can_act_as(Role::Admin));
        assert!(!Role::Editor.can_act_as(Role::Admin));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" EDITOR ".parse::<Role>().unwrap(), Role::Editor);
        assert_eq!("viewer".parse::<Role>().unwrap(), Role::Viewer);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert_eq!(err.0, "superuser");
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let r: Role = serde_json::from_str("\"viewer\"").unwrap();
        assert_eq!(r, Role::Viewer);
    }
}
