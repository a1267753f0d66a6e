//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod api_envelope;
mod file_token_store;
mod http_rental_api_client;
mod jwt_token_decoder;

pub use api_envelope::SUCCESS_CODE;
pub use file_token_store::FileTokenStore;
pub use http_rental_api_client::HttpRentalApiClient;
pub use jwt_token_decoder::JwtTokenDecoder;
