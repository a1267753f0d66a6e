use std::sync::Arc;

use tracing::debug;

use rentdesk_core::AppResult;
use rentdesk_domain::{House, ListQuery, Page, PageRequest, RepairRequest};

use crate::RentalQueryGateway;


/// Application service for rental list views.
///
/// Filters and sorts apply to the fetched page only; paging counters are
/// returned as reported by the backend.
#[derive(Clone)]
pub struct RentalListService {
    gateway: Arc<dyn RentalQueryGateway>,
}

impl RentalListService {
    /// Creates a new service from a gateway implementation.
    #[must_use]
    pub fn new(gateway: Arc<dyn RentalQueryGateway>) -> Self {
        Self { gateway }
    }

    /// Returns one page of houses with the query applied.
    pub async fn houses(&self, page: PageRequest, query: &ListQuery) -> AppResult<Page<House>> {
        let mut houses = self.gateway.list_houses(page).await?;
        query.apply(&mut houses.content);
        Ok(houses)
    }

    /// Returns one page of repair requests of a house with the query applied.
    pub async fn repair_requests_for_house(
        &self,
        house_id: &str,
        page: PageRequest,
        query: &ListQuery,
    ) -> AppResult<Page<RepairRequest>> {
        let mut requests = self
            .gateway
            .list_repair_requests_by_house(house_id, page)
            .await?;
        let fetched = requests.content.len();
        query.apply(&mut requests.content);

        debug!(
            house_id,
            fetched,
            shown = requests.content.len(),
            "repair request page filtered"
        );
        Ok(requests)
    }
}
