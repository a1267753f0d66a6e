use async_trait::async_trait;

use rentdesk_core::AppResult;
use rentdesk_domain::{House, Page, PageRequest, RepairRequest};

/// Gateway port for rental inventory list endpoints.
#[async_trait]
pub trait RentalQueryGateway: Send + Sync {
    /// Lists one page of houses visible to the caller.
    async fn list_houses(&self, page: PageRequest) -> AppResult<Page<House>>;

    /// Lists one page of repair requests raised against a house.
    async fn list_repair_requests_by_house(
        &self,
        house_id: &str,
        page: PageRequest,
    ) -> AppResult<Page<RepairRequest>>;
}
