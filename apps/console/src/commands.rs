use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use rentdesk_application::{
    PermissionMatrix, PermissionMatrixService, RentalListService, SessionService, UserNotice,
};
use rentdesk_core::{AppError, AppResult, SessionIdentity};
use rentdesk_domain::{Dashboard, ListQuery, ListSort, PageRequest, RoleId, SortDirection};
use rentdesk_infrastructure::HttpRentalApiClient;

use crate::console_config::ConsoleConfig;

/// Rentdesk administration console.
#[derive(Debug, Parser)]
#[command(name = "rentdesk-console", version)]
#[command(about = "Administer role permissions and browse rental records")]
#[command(
    after_help = "Environment:\n  RENTDESK_API_BASE_URL          Backend base URL\n  RENTDESK_TOKEN_PATH            Stored bearer token file\n  RENTDESK_ADMIN_ROLE            Role allowed to edit permissions\n  RENTDESK_PAGE_SIZE             Page size for list requests\n  RENTDESK_REQUEST_TIMEOUT_SECS  HTTP request timeout"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Store a bearer token for later commands.
    Login { token: String },
    /// Forget the stored token.
    Logout,
    /// Print the signed-in identity.
    #[command(name = "whoami")]
    WhoAmI,
    /// Print the role x permission matrix.
    Matrix,
    /// Grant a permission to a role.
    Grant { role: String, code: String },
    /// Revoke a permission from a role.
    Revoke { role: String, code: String },
    /// List repair requests of a house.
    Repairs {
        house_id: String,
        /// Keep only requests with this status.
        #[arg(long)]
        status: Option<String>,
        /// Field to sort by.
        #[arg(long)]
        sort: Option<String>,
        /// Sort order applied with `--sort`.
        #[arg(long, value_enum, default_value_t = SortOrder::Asc)]
        order: SortOrder,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl From<SortOrder> for SortDirection {
    fn from(value: SortOrder) -> Self {
        match value {
            SortOrder::Asc => Self::Asc,
            SortOrder::Desc => Self::Desc,
        }
    }
}

fn list_query(
    status: Option<String>,
    sort: Option<String>,
    order: SortOrder,
) -> AppResult<ListQuery> {
    let sort = sort
        .map(|key| ListSort::new(key, order.into()))
        .transpose()?;
    let status = status
        .map(|status| status.trim().to_owned())
        .filter(|status| !status.is_empty());

    Ok(ListQuery { status, sort })
}

/// Long-lived dependencies shared by commands.
pub struct Console {
    pub config: ConsoleConfig,
    pub http_client: reqwest::Client,
    pub session: SessionService,
}

impl Console {
    pub async fn run(&self, command: Command) -> AppResult<()> {
        match command {
            Command::Login { token } => {
                let identity = self.session.sign_in(token.as_str()).await?;
                print_notice(&UserNotice::success(format!(
                    "Signed in as {}",
                    identity.subject()
                )));
                Ok(())
            }
            Command::Logout => {
                self.session.sign_out().await?;
                print_notice(&UserNotice::success("Signed out"));
                Ok(())
            }
            Command::WhoAmI => self.who_am_i().await,
            Command::Matrix => self.show_matrix().await,
            Command::Grant { role, code } => {
                self.set_permission(role.as_str(), code.as_str(), true).await
            }
            Command::Revoke { role, code } => {
                self.set_permission(role.as_str(), code.as_str(), false).await
            }
            Command::Repairs {
                house_id,
                status,
                sort,
                order,
            } => {
                let query = list_query(status, sort, order)?;
                self.list_repairs(house_id.as_str(), &query).await
            }
        }
    }

    async fn who_am_i(&self) -> AppResult<()> {
        match self.session.current().await {
            Some(identity) => {
                println!("subject: {}", identity.subject());
                println!("roles:   {}", identity.roles().join(", "));
                if let Some(expires_at) = identity.expires_at() {
                    println!("expires: {}", expires_at.to_rfc3339());
                }
            }
            None => println!("not signed in"),
        }
        Ok(())
    }

    async fn show_matrix(&self) -> AppResult<()> {
        let (actor, service) = self.matrix_service().await?;
        let mut matrix = service.load(&actor).await?;
        if matrix.is_complete() {
            print_matrix(&matrix);
            return Ok(());
        }

        let failed: Vec<RoleId> = matrix
            .failed_roles()
            .map(|(role, _)| role.id().clone())
            .collect();
        for role_id in failed {
            if let Err(error) = service.retry_role(&actor, &mut matrix, &role_id).await {
                warn!(role_id = %role_id, error = %error, "role row retry failed");
            }
        }

        print_matrix(&matrix);
        Ok(())
    }

    async fn set_permission(&self, role_name: &str, code: &str, granted: bool) -> AppResult<()> {
        let (actor, service) = self.matrix_service().await?;
        let mut matrix = service.load(&actor).await?;

        let role_id = matrix
            .role_by_name(role_name)
            .map(|role| role.id().clone())
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' does not exist")))?;
        let permission_id = matrix
            .permission_by_code(code)
            .map(|permission| permission.id().clone())
            .ok_or_else(|| AppError::NotFound(format!("permission '{code}' does not exist")))?;

        matrix.toggle(&role_id, &permission_id, granted)?;
        if !matrix.is_dirty() {
            print_notice(&UserNotice::success("Nothing to change"));
            return Ok(());
        }

        let outcome = service.save(&actor, &mut matrix).await?;
        print_notice(&UserNotice::success("Permissions updated"));
        info!(
            granted = outcome.granted,
            revoked = outcome.revoked,
            "permission change applied"
        );
        Ok(())
    }

    async fn list_repairs(&self, house_id: &str, query: &ListQuery) -> AppResult<()> {
        let identity = self.session.require(Dashboard::Owner).await?;
        let client = self.api_client(&identity).await?;
        let service = RentalListService::new(Arc::new(client));

        let page = service
            .repair_requests_for_house(house_id, PageRequest::new(0, self.config.page_size)?, query)
            .await?;

        println!("{:<10} {:<12} {:>12}  title", "id", "status", "cost");
        for request in &page.content {
            println!(
                "{:<10} {:<12} {:>12}  {}",
                request.id,
                request.status,
                request
                    .cost
                    .map_or_else(|| "-".to_owned(), |cost| cost.to_string()),
                request.title
            );
        }
        println!(
            "{} shown, {} in house ({} pages)",
            page.content.len(),
            page.total_elements,
            page.total_pages
        );
        Ok(())
    }

    async fn matrix_service(&self) -> AppResult<(SessionIdentity, PermissionMatrixService)> {
        let identity = self.session.require(Dashboard::Admin).await?;
        let client = self.api_client(&identity).await?;
        let service = PermissionMatrixService::new(
            Arc::new(client),
            self.config.admin_role.as_str(),
            self.config.page_size,
        );
        Ok((identity, service))
    }

    async fn api_client(&self, identity: &SessionIdentity) -> AppResult<HttpRentalApiClient> {
        let token = self.session.bearer_token().await.ok_or_else(|| {
            AppError::Unauthorized(format!("no token for subject '{}'", identity.subject()))
        })?;

        Ok(
            HttpRentalApiClient::new(self.http_client.clone(), self.config.api_base_url.as_str())?
                .with_bearer_token(token),
        )
    }
}

pub fn print_notice(notice: &UserNotice) {
    match notice.level {
        rentdesk_application::NoticeLevel::Success => println!("ok: {}", notice.message),
        rentdesk_application::NoticeLevel::Error => eprintln!("error: {}", notice.message),
    }
}

fn print_matrix(matrix: &PermissionMatrix) {
    let width = matrix
        .roles()
        .iter()
        .map(|role| role.name().len())
        .max()
        .unwrap_or(4)
        .max(4);

    print!("{:width$}", "role");
    for permission in matrix.permissions() {
        print!(" {}", permission.code());
    }
    println!();

    for role in matrix.roles() {
        if !matrix.working().has_row(role.id()) {
            continue;
        }
        print!("{:width$}", role.name());
        for permission in matrix.permissions() {
            let mark = match (
                matrix.display_value(role.id(), permission.id()),
                matrix.is_cell_editable(role.id(), permission.id()),
            ) {
                (true, _) => "x",
                (false, true) => ".",
                (false, false) => "-",
            };
            print!(" {mark:^cell$}", cell = permission.code().len());
        }
        println!();
    }

    for (role, message) in matrix.failed_roles() {
        println!("{}: permissions unavailable ({message})", role.name());
    }
}
