//! Role x permission assignment grid and the change sets derived from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::security::{PermissionId, RoleId};

/// Boolean grant state per role and permission.
///
/// Cells that were never written read as not granted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrid {
    rows: BTreeMap<RoleId, BTreeMap<PermissionId, bool>>,
}

impl PermissionGrid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole row of a role.
    pub fn insert_row(&mut self, role_id: RoleId, row: BTreeMap<PermissionId, bool>) {
        self.rows.insert(role_id, row);
    }

    /// Removes the row of a role, returning it if present.
    pub fn remove_row(&mut self, role_id: &RoleId) -> Option<BTreeMap<PermissionId, bool>> {
        self.rows.remove(role_id)
    }

    /// Returns whether the grid holds a row for the role.
    #[must_use]
    pub fn has_row(&self, role_id: &RoleId) -> bool {
        self.rows.contains_key(role_id)
    }

    /// Returns the row of a role.
    #[must_use]
    pub fn row(&self, role_id: &RoleId) -> Option<&BTreeMap<PermissionId, bool>> {
        self.rows.get(role_id)
    }

    /// Returns the role identifiers that have a row.
    pub fn role_ids(&self) -> impl Iterator<Item = &RoleId> {
        self.rows.keys()
    }

    /// Returns the stored value of one cell.
    #[must_use]
    pub fn is_granted(&self, role_id: &RoleId, permission_id: &PermissionId) -> bool {
        self.rows
            .get(role_id)
            .and_then(|row| row.get(permission_id))
            .copied()
            .unwrap_or(false)
    }

    /// Writes one cell, creating the row when missing.
    pub fn set(&mut self, role_id: &RoleId, permission_id: &PermissionId, granted: bool) {
        self.rows
            .entry(role_id.clone())
            .or_default()
            .insert(permission_id.clone(), granted);
    }

    /// Writes every cell of an existing row to the same value.
    pub fn set_row_uniform(&mut self, role_id: &RoleId, granted: bool) {
        if let Some(row) = self.rows.get_mut(role_id) {
            for value in row.values_mut() {
                *value = granted;
            }
        }
    }

    /// Computes the grants and revokes that turn `self` into `target`.
    #[must_use]
    pub fn diff(&self, target: &Self) -> PermissionChangeSet {
        let mut changes = PermissionChangeSet::default();

        for (role_id, permission_id) in self.cell_keys().chain(target.cell_keys()) {
            let before = self.is_granted(role_id, permission_id);
            let after = target.is_granted(role_id, permission_id);
            if before == after {
                continue;
            }

            let change = PermissionChange {
                role_id: role_id.clone(),
                permission_id: permission_id.clone(),
            };
            let bucket = if after {
                &mut changes.grants
            } else {
                &mut changes.revokes
            };
            if !bucket.contains(&change) {
                bucket.push(change);
            }
        }

        changes
    }

    /// Returns a copy of the grid with the change set applied.
    #[must_use]
    pub fn apply(&self, changes: &PermissionChangeSet) -> Self {
        let mut next = self.clone();
        for change in &changes.grants {
            next.set(&change.role_id, &change.permission_id, true);
        }
        for change in &changes.revokes {
            next.set(&change.role_id, &change.permission_id, false);
        }
        next
    }

    fn cell_keys(&self) -> impl Iterator<Item = (&RoleId, &PermissionId)> {
        self.rows.iter().flat_map(|(role_id, row)| {
            row.keys()
                .map(move |permission_id| (role_id, permission_id))
        })
    }
}

/// One role/permission pair whose assignment changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionChange {
    /// Role receiving or losing the permission.
    pub role_id: RoleId,
    /// Permission being granted or revoked.
    pub permission_id: PermissionId,
}

/// Minimal set of backend operations between two grids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionChangeSet {
    /// Pairs to assign.
    pub grants: Vec<PermissionChange>,
    /// Pairs to remove.
    pub revokes: Vec<PermissionChange>,
}

impl PermissionChangeSet {
    /// Returns whether no operation is needed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty() && self.revokes.is_empty()
    }

    /// Returns the total number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.len() + self.revokes.len()
    }
}
