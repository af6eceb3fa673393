use crate::portico::handlers::{
    principal::AuthUser,
    types::{ErrorResponse, ProfileResponse},
};
use axum::{http::StatusCode, response::IntoResponse, Json};
use tracing::{debug, instrument};

#[utoipa::path(
    get,
    path= "/profile",
    responses (
        (status = 200, description = "Claims of the authenticated user", body = ProfileResponse, content_type = "application/json"),
        (status = 401, description = "Missing, invalid or expired bearer token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag= "profile"
)]
// axum handler for profile, claims are trusted as-is
#[instrument(skip(user))]
pub async fn profile(user: AuthUser) -> impl IntoResponse {
    let AuthUser(claims) = user;

    debug!("profile for {}", claims.email);

    (
        StatusCode::OK,
        Json(ProfileResponse {
            success: true,
            user: claims.into(),
        }),
    )
}
