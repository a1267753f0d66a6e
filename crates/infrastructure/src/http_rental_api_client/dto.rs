use serde::Deserialize;

use rentdesk_core::AppResult;
use rentdesk_domain::{House, Page, Permission, PermissionId, RepairRequest, Role, RoleId};

/// Backend identifiers arrive either as numbers or as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum WireId {
    Number(i64),
    Text(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PageDto<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
}

impl<T> PageDto<T> {
    pub(super) fn into_page<U>(self, mapper: impl FnMut(T) -> AppResult<U>) -> AppResult<Page<U>> {
        Page {
            content: self.content,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
        .try_map(mapper)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RoleDto {
    id: WireId,
    name: String,
}

impl RoleDto {
    pub(super) fn into_domain(self) -> AppResult<Role> {
        Role::new(RoleId::new(self.id.into_string())?, self.name)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PermissionDto {
    id: WireId,
    code: String,
    description: Option<String>,
}

impl PermissionDto {
    pub(super) fn into_domain(self) -> AppResult<Permission> {
        Permission::new(
            PermissionId::new(self.id.into_string())?,
            self.code,
            self.description,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HouseDto {
    id: WireId,
    name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    rent: i64,
    #[serde(default)]
    status: String,
}

impl HouseDto {
    pub(super) fn into_domain(self) -> AppResult<House> {
        Ok(House {
            id: self.id.into_string(),
            name: self.name,
            address: self.address,
            rent: self.rent,
            status: self.status,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RepairRequestDto {
    id: WireId,
    house_id: Option<WireId>,
    room_id: Option<WireId>,
    #[serde(default)]
    title: String,
    description: Option<String>,
    #[serde(default)]
    status: String,
    cost: Option<i64>,
    created_at: Option<String>,
}

impl RepairRequestDto {
    pub(super) fn into_domain(self, house_id: &str) -> AppResult<RepairRequest> {
        Ok(RepairRequest {
            id: self.id.into_string(),
            house_id: self
                .house_id
                .map(WireId::into_string)
                .unwrap_or_else(|| house_id.to_owned()),
            room_id: self.room_id.map(WireId::into_string),
            title: self.title,
            description: self.description,
            status: self.status,
            cost: self.cost,
            created_at: self.created_at,
        })
    }
}
