//! Application services and ports.

#![forbid(unsafe_code)]

mod notice;
mod permission_admin_ports;
mod permission_matrix;
mod permission_matrix_service;
mod rental_list_service;
mod rental_ports;
mod session_ports;
mod session_service;

pub use notice::{NoticeLevel, UserNotice};
pub use permission_admin_ports::PermissionAdminGateway;
pub use permission_matrix::{PermissionMatrix, RoleRowStatus};
pub use permission_matrix_service::{MatrixSaveOutcome, PermissionMatrixService};
pub use rental_list_service::RentalListService;
pub use rental_ports::RentalQueryGateway;
pub use session_ports::{TokenDecoder, TokenStore};
pub use session_service::{SessionService, app_roles};
