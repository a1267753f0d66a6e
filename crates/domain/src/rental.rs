//! Read projections of houses and their repair requests.
//!
//! The backend owns every business rule for these records; the client only
//! lists, filters and sorts them.

use serde::{Deserialize, Serialize};

use crate::listing::{FieldValue, ListRecord};

/// Rentable house owned by an owner account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct House {
    /// Backend identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Monthly rent in minor-less currency units.
    pub rent: i64,
    /// Availability status.
    pub status: String,
}

/// Repair request raised against a house or room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairRequest {
    /// Backend identifier.
    pub id: String,
    /// House the request belongs to.
    pub house_id: String,
    /// Room the request targets, if any.
    pub room_id: Option<String>,
    /// Short summary.
    pub title: String,
    /// Free-form details.
    pub description: Option<String>,
    /// Workflow status.
    pub status: String,
    /// Estimated or final cost.
    pub cost: Option<i64>,
    /// Creation timestamp as reported by the backend.
    pub created_at: Option<String>,
}

fn number(value: i64) -> FieldValue<'static> {
    FieldValue::Number(value as f64)
}

impl ListRecord for House {
    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        match key {
            "name" => Some(FieldValue::Text(self.name.as_str())),
            "address" => Some(FieldValue::Text(self.address.as_str())),
            "rent" => Some(number(self.rent)),
            "status" => Some(FieldValue::Text(self.status.as_str())),
            _ => None,
        }
    }
}

impl ListRecord for RepairRequest {
    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        match key {
            "title" => Some(FieldValue::Text(self.title.as_str())),
            "status" => Some(FieldValue::Text(self.status.as_str())),
            "cost" => self.cost.map(number),
            "createdAt" | "created_at" => self.created_at.as_deref().map(FieldValue::Text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{House, RepairRequest};
    use crate::listing::{ListQuery, ListSort, SortDirection};

    fn repair(id: &str, cost: Option<i64>, status: &str) -> RepairRequest {
        RepairRequest {
            id: id.to_owned(),
            house_id: "h1".to_owned(),
            room_id: None,
            title: format!("repair {id}"),
            description: None,
            status: status.to_owned(),
            cost,
            created_at: None,
        }
    }

    #[test]
    fn repairs_without_cost_sort_after_priced_ones() {
        let mut requests = vec![
            repair("1", None, "PENDING"),
            repair("2", Some(500_000), "PENDING"),
            repair("3", Some(120_000), "DONE"),
        ];
        ListQuery {
            status: None,
            sort: Some(
                ListSort::new("cost", SortDirection::Asc).unwrap_or_else(|_| unreachable!()),
            ),
        }
        .apply(&mut requests);

        let ids: Vec<&str> = requests.iter().map(|request| request.id.as_str()).collect();
        assert_eq!(ids, ["3", "2", "1"]);
    }

    #[test]
    fn houses_filter_by_status_and_sort_by_address() {
        let house = |id: &str, address: &str, status: &str| House {
            id: id.to_owned(),
            name: format!("house {id}"),
            address: address.to_owned(),
            rent: 2_000_000,
            status: status.to_owned(),
        };
        let mut houses = vec![
            house("1", "Lê Lợi", "AVAILABLE"),
            house("2", "Âu Cơ", "AVAILABLE"),
            house("3", "Bà Triệu", "RENTED"),
        ];
        ListQuery {
            status: Some("AVAILABLE".to_owned()),
            sort: Some(
                ListSort::new("address", SortDirection::Asc).unwrap_or_else(|_| unreachable!()),
            ),
        }
        .apply(&mut houses);

        let ids: Vec<&str> = houses.iter().map(|house| house.id.as_str()).collect();
        assert_eq!(ids, ["2", "1"]);
    }
}
