//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod assignment;
mod listing;
mod paging;
mod rental;
mod route;
mod security;

pub use assignment::{PermissionChange, PermissionChangeSet, PermissionGrid};
pub use listing::{FieldValue, ListQuery, ListRecord, ListSort, SortDirection};
pub use paging::{MAX_PAGE_SIZE, Page, PageRequest};
pub use rental::{House, RepairRequest};
pub use route::{Dashboard, RouteDecision, check_route};
pub use security::{ALL_PERMISSION_CODE, AppRole, Permission, PermissionId, Role, RoleId};
