use async_trait::async_trait;

use rentdesk_core::AppResult;
use rentdesk_domain::{Page, PageRequest, Permission, PermissionId, Role, RoleId};

/// Gateway port for role and permission administration endpoints.
#[async_trait]
pub trait PermissionAdminGateway: Send + Sync {
    /// Lists one page of roles.
    async fn list_roles(&self, page: PageRequest) -> AppResult<Page<Role>>;

    /// Lists one page of permissions.
    async fn list_permissions(&self, page: PageRequest) -> AppResult<Page<Permission>>;

    /// Lists permissions currently assigned to a role.
    async fn list_role_permissions(&self, role_id: &RoleId) -> AppResult<Vec<Permission>>;

    /// Assigns a permission to a role.
    async fn assign_permission(
        &self,
        role_id: &RoleId,
        permission_id: &PermissionId,
    ) -> AppResult<()>;

    /// Removes a permission from a role.
    async fn remove_permission(
        &self,
        role_id: &RoleId,
        permission_id: &PermissionId,
    ) -> AppResult<()>;
}
