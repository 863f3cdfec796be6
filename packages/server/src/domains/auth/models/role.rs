use serde::{Deserialize, Serialize};

/// Role every signed-in user has unless the backend says otherwise
pub const DEFAULT_ROLE: &str = "USER";

/// Resolved authorization role of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub role: String,
    pub is_admin: bool,
}

impl RoleInfo {
    /// Normalize a raw role name (trimmed, uppercase) and classify it
    /// against the admin allow-list
    pub fn classify(raw_role: &str, admin_roles: &[String]) -> Self {
        let role = raw_role.trim().to_uppercase();
        if role.is_empty() {
            return Self::default();
        }
        let is_admin = admin_roles.iter().any(|admin| admin.eq_ignore_ascii_case(&role));
        Self { role, is_admin }
    }

    /// Whether this role is in a route's allow-list
    pub fn is_any_of(&self, allowed: &[&str]) -> bool {
        allowed.iter().any(|role| role.eq_ignore_ascii_case(&self.role))
    }
}

impl Default for RoleInfo {
    fn default() -> Self {
        Self {
            role: DEFAULT_ROLE.to_string(),
            is_admin: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admins() -> Vec<String> {
        vec!["SUPERADMIN".to_string(), "SUPPORT".to_string()]
    }

    #[test]
    fn test_classify_uppercases() {
        let info = RoleInfo::classify(" superadmin ", &admins());
        assert_eq!(info.role, "SUPERADMIN");
        assert!(info.is_admin);

        let info = RoleInfo::classify("Support", &admins());
        assert_eq!(info.role, "SUPPORT");
        assert!(info.is_admin);
    }

    #[test]
    fn test_only_allow_listed_roles_are_admin() {
        for role in ["admin", "USER", "partner", "agent"] {
            assert!(!RoleInfo::classify(role, &admins()).is_admin, "{}", role);
        }
    }

    #[test]
    fn test_blank_role_falls_back_to_default() {
        assert_eq!(RoleInfo::classify("  ", &admins()), RoleInfo::default());
        assert_eq!(RoleInfo::default().role, DEFAULT_ROLE);
    }

    #[test]
    fn test_is_any_of() {
        let info = RoleInfo::classify("support", &admins());
        assert!(info.is_any_of(&["SUPERADMIN", "SUPPORT"]));
        assert!(!info.is_any_of(&["SUPERADMIN"]));
    }
}
