/// HTTP handlers module
/// Provides the REST endpoints and their error mapping

pub mod error;
pub mod rest;

pub use error::{json_error_handler, query_error_handler, ApiError};
pub use rest::{get_statistics, health, index, list_users, login, register, save_statistics};
