use std::collections::{BTreeMap, BTreeSet};

use rentdesk_core::{AppError, AppResult};
use rentdesk_domain::{Permission, PermissionChangeSet, PermissionGrid, PermissionId, Role, RoleId};


/// Load state of one role row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRowStatus {
    /// Assigned permissions have not arrived yet.
    Pending,
    /// Row is present in the grid.
    Loaded,
    /// Fetch failed; the row is absent until retried.
    Failed(String),
}

/// Editable role x permission matrix with a committed baseline.
///
/// The committed grid mirrors what the backend confirmed; the working grid
/// holds user edits. Rows of roles whose fetch failed are absent from both.
#[derive(Debug, Clone)]
pub struct PermissionMatrix {
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    admin_role_name: String,
    row_status: BTreeMap<RoleId, RoleRowStatus>,
    committed: PermissionGrid,
    working: PermissionGrid,
}

impl PermissionMatrix {
    /// Creates a matrix with every role row pending.
    #[must_use]
    pub fn new(
        roles: Vec<Role>,
        permissions: Vec<Permission>,
        admin_role_name: impl Into<String>,
    ) -> Self {
        let row_status = roles
            .iter()
            .map(|role| (role.id().clone(), RoleRowStatus::Pending))
            .collect();

        Self {
            roles,
            permissions,
            admin_role_name: admin_role_name.into(),
            row_status,
            committed: PermissionGrid::new(),
            working: PermissionGrid::new(),
        }
    }

    /// Returns matrix roles in display order.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        self.roles.as_slice()
    }

    /// Returns matrix permissions in display order.
    #[must_use]
    pub fn permissions(&self) -> &[Permission] {
        self.permissions.as_slice()
    }

    /// Returns the load state of a role row.
    #[must_use]
    pub fn row_status(&self, role_id: &RoleId) -> Option<&RoleRowStatus> {
        self.row_status.get(role_id)
    }

    /// Returns roles whose row failed to load, with the failure message.
    pub fn failed_roles(&self) -> impl Iterator<Item = (&Role, &str)> {
        self.roles
            .iter()
            .filter_map(|role| match self.row_status.get(role.id()) {
                Some(RoleRowStatus::Failed(message)) => Some((role, message.as_str())),
                _ => None,
            })
    }

    /// Returns whether every role row has either loaded or failed.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !self
            .row_status
            .values()
            .any(|status| matches!(status, RoleRowStatus::Pending))
    }

    /// Returns whether every role row loaded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.row_status
            .values()
            .all(|status| matches!(status, RoleRowStatus::Loaded))
    }

    /// Builds the row of a role from the permissions assigned to it.
    ///
    /// The row replaces any previous state of that role in both the working
    /// and the committed grid.
    pub fn load_role_row(&mut self, role_id: &RoleId, assigned: &[Permission]) -> AppResult<()> {
        self.require_role(role_id)?;

        let assigned_codes: BTreeSet<&str> = assigned.iter().map(Permission::code).collect();
        let row: BTreeMap<PermissionId, bool> = self
            .permissions
            .iter()
            .map(|permission| {
                (
                    permission.id().clone(),
                    assigned_codes.contains(permission.code()),
                )
            })
            .collect();

        self.committed.insert_row(role_id.clone(), row.clone());
        self.working.insert_row(role_id.clone(), row);
        self.row_status
            .insert(role_id.clone(), RoleRowStatus::Loaded);
        Ok(())
    }

    /// Records a failed row fetch and drops the row from both grids.
    pub fn fail_role_row(&mut self, role_id: &RoleId, message: impl Into<String>) -> AppResult<()> {
        self.require_role(role_id)?;

        self.committed.remove_row(role_id);
        self.working.remove_row(role_id);
        self.row_status
            .insert(role_id.clone(), RoleRowStatus::Failed(message.into()));
        Ok(())
    }

    /// Returns whether the role is the designated administrative role.
    #[must_use]
    pub fn is_admin_role(&self, role_id: &RoleId) -> bool {
        self.find_role(role_id)
            .is_some_and(|role| role.name().eq_ignore_ascii_case(&self.admin_role_name))
    }

    /// Returns whether the user may change the cell.
    #[must_use]
    pub fn is_cell_editable(&self, role_id: &RoleId, permission_id: &PermissionId) -> bool {
        let Some(permission) = self.find_permission(permission_id) else {
            return false;
        };
        if !self.working.has_row(role_id) {
            return false;
        }

        !permission.is_all() || self.is_admin_role(role_id)
    }

    /// Returns the value shown for a cell.
    ///
    /// The `ALL` cell always shows unchecked outside the administrative role,
    /// whatever the working grid stores.
    #[must_use]
    pub fn display_value(&self, role_id: &RoleId, permission_id: &PermissionId) -> bool {
        let forced_off = self
            .find_permission(permission_id)
            .is_some_and(Permission::is_all)
            && !self.is_admin_role(role_id);

        !forced_off && self.working.is_granted(role_id, permission_id)
    }

    /// Sets a cell in the working grid.
    ///
    /// Setting the `ALL` cell writes the same value to every cell of the role.
    pub fn toggle(
        &mut self,
        role_id: &RoleId,
        permission_id: &PermissionId,
        granted: bool,
    ) -> AppResult<()> {
        let is_all = self
            .find_permission(permission_id)
            .map(Permission::is_all)
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' is not in the matrix"))
            })?;
        self.require_role(role_id)?;

        if !self.working.has_row(role_id) {
            return Err(AppError::Conflict(format!(
                "permissions of role '{role_id}' are not loaded"
            )));
        }

        if is_all {
            if !self.is_admin_role(role_id) {
                return Err(AppError::Forbidden(format!(
                    "only the '{}' role may hold the ALL permission",
                    self.admin_role_name
                )));
            }
            self.working.set_row_uniform(role_id, granted);
        } else {
            self.working.set(role_id, permission_id, granted);
        }

        Ok(())
    }

    /// Returns the grants and revokes needed to persist the edits.
    #[must_use]
    pub fn pending_changes(&self) -> PermissionChangeSet {
        self.committed.diff(&self.working)
    }

    /// Returns whether the working grid differs from the committed baseline.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.pending_changes().is_empty()
    }

    /// Discards edits, restoring the committed baseline.
    pub fn cancel(&mut self) {
        self.working = self.committed.clone();
    }

    /// Promotes the working grid to the committed baseline.
    pub fn commit(&mut self) {
        self.committed = self.working.clone();
    }

    /// Returns the working grid.
    #[must_use]
    pub fn working(&self) -> &PermissionGrid {
        &self.working
    }

    /// Returns the committed baseline.
    #[must_use]
    pub fn committed(&self) -> &PermissionGrid {
        &self.committed
    }

    /// Finds a role by its name, ignoring case.
    #[must_use]
    pub fn role_by_name(&self, name: &str) -> Option<&Role> {
        self.roles
            .iter()
            .find(|role| role.name().eq_ignore_ascii_case(name))
    }

    /// Finds a permission by its code.
    #[must_use]
    pub fn permission_by_code(&self, code: &str) -> Option<&Permission> {
        self.permissions
            .iter()
            .find(|permission| permission.code() == code)
    }

    fn find_role(&self, role_id: &RoleId) -> Option<&Role> {
        self.roles.iter().find(|role| role.id() == role_id)
    }

    fn find_permission(&self, permission_id: &PermissionId) -> Option<&Permission> {
        self.permissions
            .iter()
            .find(|permission| permission.id() == permission_id)
    }

    fn require_role(&self, role_id: &RoleId) -> AppResult<()> {
        if self.find_role(role_id).is_none() {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' is not in the matrix"
            )));
        }

        Ok(())
    }
}
