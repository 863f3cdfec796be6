//! Role lookup with fallbacks

use tracing::{debug, warn};
use uuid::Uuid;

use crate::domains::auth::models::RoleInfo;
use crate::kernel::BaseAuthBackend;

/// Fetch and classify a user's role.
///
/// The privileged function is asked first, the roles table second. Nothing
/// found, or both failing, means the default role. Never fails.
pub async fn fetch_role(
    backend: &dyn BaseAuthBackend,
    user_id: Uuid,
    admin_roles: &[String],
) -> RoleInfo {
    match backend.role_for_user(user_id).await {
        Ok(Some(role)) if !role.trim().is_empty() => {
            return RoleInfo::classify(&role, admin_roles);
        }
        Ok(_) => debug!(%user_id, "Role function returned nothing, reading roles table"),
        Err(e) => warn!(%user_id, error = %e, "Role function failed, reading roles table"),
    }

    match backend.role_from_table(user_id).await {
        Ok(Some(role)) => RoleInfo::classify(&role, admin_roles),
        Ok(None) => RoleInfo::default(),
        Err(e) => {
            warn!(%user_id, error = %e, "Role table lookup failed, using default role");
            RoleInfo::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::auth::models::DEFAULT_ROLE;
    use crate::kernel::MockAuthBackend;

    fn admins() -> Vec<String> {
        vec!["SUPERADMIN".to_string(), "SUPPORT".to_string()]
    }

    #[tokio::test]
    async fn test_function_result_is_classified() {
        let id = Uuid::new_v4();
        let backend = MockAuthBackend::new().with_role(id, "support");

        let info = fetch_role(&backend, id, &admins()).await;
        assert_eq!(info.role, "SUPPORT");
        assert!(info.is_admin);
    }

    #[tokio::test]
    async fn test_table_fallback_when_function_fails() {
        let id = Uuid::new_v4();
        let backend = MockAuthBackend::new()
            .with_failing_role_rpc()
            .with_table_role(id, "superadmin");

        let info = fetch_role(&backend, id, &admins()).await;
        assert_eq!(info.role, "SUPERADMIN");
        assert!(info.is_admin);
    }

    #[tokio::test]
    async fn test_defaults_when_nothing_is_known() {
        let backend = MockAuthBackend::new().with_failing_role_rpc();
        let info = fetch_role(&backend, Uuid::new_v4(), &admins()).await;
        assert_eq!(info.role, DEFAULT_ROLE);
        assert!(!info.is_admin);
    }
}
