use async_trait::async_trait;
use reqwest::{Method, header};
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use rentdesk_application::{PermissionAdminGateway, RentalQueryGateway};
use rentdesk_core::{AppError, AppResult};
use rentdesk_domain::{
    House, Page, PageRequest, Permission, PermissionId, RepairRequest, Role, RoleId,
};

use crate::api_envelope::decode_envelope;

mod dto;


use dto::{HouseDto, PageDto, PermissionDto, RepairRequestDto, RoleDto};

/// REST client for the rental management backend.
#[derive(Clone)]
pub struct HttpRentalApiClient {
    http_client: reqwest::Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl HttpRentalApiClient {
    /// Creates a client for the backend rooted at `base_url`.
    pub fn new(http_client: reqwest::Client, base_url: &str) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|error| {
            AppError::Validation(format!("invalid API base URL '{base_url}': {error}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "API base URL '{base_url}' cannot carry paths"
            )));
        }

        Ok(Self {
            http_client,
            base_url,
            bearer_token: None,
        })
    }

    /// Returns a client that authenticates with the bearer token.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn endpoint(&self, segments: &[&str], page: Option<PageRequest>) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Internal(format!("API base URL '{}' cannot carry paths", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);

        if let Some(page) = page {
            url.query_pairs_mut()
                .append_pair("page", page.page().to_string().as_str())
                .append_pair("size", page.size().to_string().as_str());
        }

        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, method: Method, url: Url) -> AppResult<T> {
        let request_id = Uuid::new_v4();
        let mut builder = self
            .http_client
            .request(method.clone(), url.clone())
            .header(header::ACCEPT, "application/json")
            .header("X-Request-Id", request_id.to_string());
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|error| {
            AppError::Network(format!("failed to call {method} {}: {error}", url.path()))
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|error| {
            AppError::Network(format!(
                "failed to read response of {method} {}: {error}",
                url.path()
            ))
        })?;

        debug!(
            %request_id,
            method = %method,
            path = url.path(),
            status = status.as_u16(),
            "backend call completed"
        );

        decode_envelope(status, body.as_str())
    }
}

#[async_trait]
impl PermissionAdminGateway for HttpRentalApiClient {
    async fn list_roles(&self, page: PageRequest) -> AppResult<Page<Role>> {
        let url = self.endpoint(&["roles", "getAll"], Some(page))?;
        let body: PageDto<RoleDto> = self.send(Method::GET, url).await?;
        body.into_page(RoleDto::into_domain)
    }

    async fn list_permissions(&self, page: PageRequest) -> AppResult<Page<Permission>> {
        let url = self.endpoint(&["permissions", "getAll"], Some(page))?;
        let body: PageDto<PermissionDto> = self.send(Method::GET, url).await?;
        body.into_page(PermissionDto::into_domain)
    }

    async fn list_role_permissions(&self, role_id: &RoleId) -> AppResult<Vec<Permission>> {
        let url = self.endpoint(&["roles", role_id.as_str(), "permissions"], None)?;
        let body: Vec<PermissionDto> = self.send(Method::GET, url).await?;
        body.into_iter().map(PermissionDto::into_domain).collect()
    }

    async fn assign_permission(
        &self,
        role_id: &RoleId,
        permission_id: &PermissionId,
    ) -> AppResult<()> {
        let url = self.endpoint(
            &["roles", role_id.as_str(), "permissions", permission_id.as_str()],
            None,
        )?;
        let _: IgnoredAny = self.send(Method::POST, url).await?;
        Ok(())
    }

    async fn remove_permission(
        &self,
        role_id: &RoleId,
        permission_id: &PermissionId,
    ) -> AppResult<()> {
        let url = self.endpoint(
            &["roles", role_id.as_str(), "permissions", permission_id.as_str()],
            None,
        )?;
        let _: IgnoredAny = self.send(Method::DELETE, url).await?;
        Ok(())
    }
}

#[async_trait]
impl RentalQueryGateway for HttpRentalApiClient {
    async fn list_houses(&self, page: PageRequest) -> AppResult<Page<House>> {
        let url = self.endpoint(&["houses", "getAll"], Some(page))?;
        let body: PageDto<HouseDto> = self.send(Method::GET, url).await?;
        body.into_page(HouseDto::into_domain)
    }

    async fn list_repair_requests_by_house(
        &self,
        house_id: &str,
        page: PageRequest,
    ) -> AppResult<Page<RepairRequest>> {
        let url = self.endpoint(&["repair-requests", "house", house_id], Some(page))?;
        let body: PageDto<RepairRequestDto> = self.send(Method::GET, url).await?;
        body.into_page(|dto| dto.into_domain(house_id))
    }
}
