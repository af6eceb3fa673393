pub mod health;
pub use self::health::health;

pub mod user_register;
pub use self::user_register::register;

pub mod user_login;
pub use self::user_login::login;

pub mod user_profile;
pub use self::user_profile::profile;

pub mod principal;
pub mod types;

// common functions for the handlers
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use types::ErrorResponse;

pub const MSG_USER_EXISTS: &str = "User with this email already exist";
pub const MSG_USER_NOT_FOUND: &str = "User Not Found";
pub const MSG_INCORRECT_CREDENTIALS: &str = "Incorrect Credentials";
pub const MSG_UNAUTHORIZED: &str = "Unauthorized";
pub const MSG_INVALID_TOKEN: &str = "Invalid or Expired Token";
pub const MSG_MISSING_PAYLOAD: &str = "Missing payload";
pub const MSG_INTERNAL_ERROR: &str = "Internal Server Error";

/// `{success: false, message}` with the given status.
pub fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}
