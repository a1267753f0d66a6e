use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, warn};

use rentdesk_core::{AppError, AppResult, SessionIdentity};
use rentdesk_domain::{
    Page, PageRequest, Permission, PermissionChange, PermissionChangeSet, RoleId,
};

use crate::{PermissionAdminGateway, PermissionMatrix};


/// Counts of backend operations applied by a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatrixSaveOutcome {
    /// Assignments created.
    pub granted: usize,
    /// Assignments removed.
    pub revoked: usize,
}

#[derive(Debug, Clone, Copy)]
enum ChangeKind {
    Grant,
    Revoke,
}

/// Application service that loads and saves the permission matrix.
#[derive(Clone)]
pub struct PermissionMatrixService {
    gateway: Arc<dyn PermissionAdminGateway>,
    admin_role_name: String,
    page_size: u32,
}

impl PermissionMatrixService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn PermissionAdminGateway>,
        admin_role_name: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            gateway,
            admin_role_name: admin_role_name.into(),
            page_size,
        }
    }

    /// Loads roles, permissions and every role row into a fresh matrix.
    ///
    /// Role rows are fetched concurrently. A failed row is recorded on the
    /// matrix instead of failing the whole load.
    pub async fn load(&self, actor: &SessionIdentity) -> AppResult<PermissionMatrix> {
        self.require_admin(actor)?;

        let page = PageRequest::new(0, self.page_size)?;
        let roles = collect_pages(page, |request| self.gateway.list_roles(request)).await?;
        let permissions =
            collect_pages(page, |request| self.gateway.list_permissions(request)).await?;

        let role_ids: Vec<RoleId> = roles.iter().map(|role| role.id().clone()).collect();
        let mut matrix =
            PermissionMatrix::new(roles, permissions, self.admin_role_name.as_str());

        let mut fetches = JoinSet::new();
        for role_id in role_ids {
            let gateway = self.gateway.clone();
            fetches.spawn(async move {
                let result = gateway.list_role_permissions(&role_id).await;
                (role_id, result)
            });
        }

        while let Some(joined) = fetches.join_next().await {
            let (role_id, result) = joined.map_err(|error| {
                AppError::Internal(format!("role permission fetch task failed: {error}"))
            })?;
            apply_row_result(&mut matrix, &role_id, result)?;
        }

        if !matrix.is_settled() {
            return Err(AppError::Internal(
                "permission matrix load finished with pending role rows".to_owned(),
            ));
        }

        info!(
            subject = %actor.subject(),
            roles = matrix.roles().len(),
            permissions = matrix.permissions().len(),
            complete = matrix.is_complete(),
            failed_rows = matrix.failed_roles().count(),
            "permission matrix loaded"
        );

        Ok(matrix)
    }

    /// Refetches one role row, replacing its previous state.
    pub async fn retry_role(
        &self,
        actor: &SessionIdentity,
        matrix: &mut PermissionMatrix,
        role_id: &RoleId,
    ) -> AppResult<()> {
        self.require_admin(actor)?;

        let result = self.gateway.list_role_permissions(role_id).await;
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        apply_row_result(matrix, role_id, result)?;
        outcome
    }

    /// Persists the pending edits of the matrix.
    ///
    /// All operations run concurrently. The committed baseline moves only when
    /// every operation succeeds; on failure the working grid stays as edited
    /// and operations that already succeeded are not rolled back.
    pub async fn save(
        &self,
        actor: &SessionIdentity,
        matrix: &mut PermissionMatrix,
    ) -> AppResult<MatrixSaveOutcome> {
        self.require_admin(actor)?;

        let changes = matrix.pending_changes();
        if changes.is_empty() {
            return Ok(MatrixSaveOutcome::default());
        }

        let total = changes.len();
        let errors = self.dispatch_changes(&changes).await;

        if let Some(first_error) = errors.first() {
            warn!(
                subject = %actor.subject(),
                failed = errors.len(),
                total,
                error = %first_error,
                "permission matrix save failed"
            );

            return Err(if errors.len() == 1 {
                first_error.clone()
            } else {
                AppError::Internal(format!(
                    "{} of {total} permission changes failed; first error: {}",
                    errors.len(),
                    first_error.user_message()
                ))
            });
        }

        matrix.commit();

        let outcome = MatrixSaveOutcome {
            granted: changes.grants.len(),
            revoked: changes.revokes.len(),
        };
        info!(
            subject = %actor.subject(),
            granted = outcome.granted,
            revoked = outcome.revoked,
            "permission matrix saved"
        );

        Ok(outcome)
    }

    async fn dispatch_changes(&self, changes: &PermissionChangeSet) -> Vec<AppError> {
        let mut operations = JoinSet::new();
        let tagged = changes
            .grants
            .iter()
            .map(|change| (ChangeKind::Grant, change))
            .chain(changes.revokes.iter().map(|change| (ChangeKind::Revoke, change)));

        for (kind, change) in tagged {
            let gateway = self.gateway.clone();
            let PermissionChange {
                role_id,
                permission_id,
            } = change.clone();
            operations.spawn(async move {
                match kind {
                    ChangeKind::Grant => gateway.assign_permission(&role_id, &permission_id).await,
                    ChangeKind::Revoke => gateway.remove_permission(&role_id, &permission_id).await,
                }
            });
        }

        let mut errors = Vec::new();
        while let Some(joined) = operations.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(error)) => errors.push(error),
                Err(error) => errors.push(AppError::Internal(format!(
                    "permission change task failed: {error}"
                ))),
            }
        }

        errors
    }

    fn require_admin(&self, actor: &SessionIdentity) -> AppResult<()> {
        if actor.has_role(self.admin_role_name.as_str()) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "subject '{}' is missing role '{}'",
            actor.subject(),
            self.admin_role_name
        )))
    }
}

fn apply_row_result(
    matrix: &mut PermissionMatrix,
    role_id: &RoleId,
    result: AppResult<Vec<Permission>>,
) -> AppResult<()> {
    match result {
        Ok(assigned) => matrix.load_role_row(role_id, &assigned),
        Err(error) => {
            warn!(role_id = %role_id, error = %error, "failed to load role permissions");
            matrix.fail_role_row(role_id, error.user_message())
        }
    }
}

async fn collect_pages<T, F, Fut>(first: PageRequest, mut fetch: F) -> AppResult<Vec<T>>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: std::future::Future<Output = AppResult<Page<T>>>,
{
    let mut request = first;
    let mut items = Vec::new();

    loop {
        let page = fetch(request).await?;
        let has_more = page.has_more_after(request) && !page.content.is_empty();
        items.extend(page.content);
        if !has_more {
            return Ok(items);
        }
        request = request.next();
    }
}
