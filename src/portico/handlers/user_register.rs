use crate::portico::{
    handlers::{
        failure,
        types::{ErrorResponse, Session, SessionResponse, UserRegister},
        MSG_INTERNAL_ERROR, MSG_MISSING_PAYLOAD, MSG_USER_EXISTS,
    },
    password::hash_password,
    repository::{RepositoryError, User, UserRepository},
    token::TokenIssuer,
};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

#[utoipa::path(
    post,
    path= "/register",
    request_body = UserRegister,
    responses (
        (status = 201, description = "Registration successful", body = SessionResponse, content_type = "application/json"),
        (status = 400, description = "Missing or malformed payload", body = ErrorResponse),
        (status = 409, description = "User with the specified email already exists", body = ErrorResponse),
    ),
    tag= "register"
)]
// axum handler for register
#[instrument(skip(users, tokens, payload))]
pub async fn register(
    users: Extension<Arc<dyn UserRepository>>,
    tokens: Extension<Arc<TokenIssuer>>,
    payload: Option<Json<UserRegister>>,
) -> Response {
    let user: UserRegister = match payload {
        Some(Json(payload)) => payload,
        None => return failure(StatusCode::BAD_REQUEST, MSG_MISSING_PAYLOAD),
    };

    debug!("user: {:?}", user);

    if users.exists_by_email(&user.email).await {
        debug!("User already exists");
        return failure(StatusCode::CONFLICT, MSG_USER_EXISTS);
    }

    let password_hash = match hash_password(&user.password).await {
        Ok(hash) => hash,
        Err(e) => {
            error!("Error hashing password: {:?}", e);
            return failure(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL_ERROR);
        }
    };

    // another registration may have taken the email while hashing
    match users
        .insert(User {
            email: user.email.clone(),
            name: user.name.clone(),
            password_hash,
        })
        .await
    {
        Ok(()) => (),
        Err(RepositoryError::Conflict(_)) => {
            debug!("User already exists");
            return failure(StatusCode::CONFLICT, MSG_USER_EXISTS);
        }
    }

    let token = match tokens.issue(&user.email, &user.name) {
        Ok(token) => token,
        Err(e) => {
            error!("Error issuing token: {:?}", e);
            return failure(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL_ERROR);
        }
    };

    info!("User registered");

    (
        StatusCode::CREATED,
        Json(SessionResponse {
            success: true,
            data: Session {
                email: user.email,
                name: user.name,
                token,
            },
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portico::repository::InMemoryUserRepository;
    use anyhow::Result;
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request},
        routing::post,
        Router,
    };
    use secrecy::SecretString;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(users: Arc<InMemoryUserRepository>) -> Router {
        let users: Arc<dyn UserRepository> = users;
        let tokens = Arc::new(TokenIssuer::new(&SecretString::from(
            "test-secret".to_string(),
        )));

        Router::new()
            .route("/register", post(register))
            .layer(Extension(users))
            .layer(Extension(tokens))
    }

    fn request(body: &str) -> Result<Request<Body>> {
        Ok(Request::builder()
            .method("POST")
            .uri("/register")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?)
    }

    async fn json_body(response: Response) -> Result<Value> {
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    #[tokio::test]
    async fn register_creates_user_and_returns_token() -> Result<()> {
        let users = Arc::new(InMemoryUserRepository::new());
        let payload = json!({"name": "A", "email": "a@x.com", "password": "p"}).to_string();

        let response = app(users.clone()).oneshot(request(&payload)?).await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await?;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["email"], "a@x.com");
        assert_eq!(body["data"]["name"], "A");
        assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));

        let stored = users.find_by_email("a@x.com").await;
        assert!(stored.is_some_and(|u| u.password_hash != "p"));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() -> Result<()> {
        let users = Arc::new(InMemoryUserRepository::new());
        let payload = json!({"name": "A", "email": "a@x.com", "password": "p"}).to_string();

        let first = app(users.clone()).oneshot(request(&payload)?).await?;
        assert_eq!(first.status(), StatusCode::CREATED);

        let again = json!({"name": "B", "email": "a@x.com", "password": "q"}).to_string();
        let second = app(users.clone()).oneshot(request(&again)?).await?;
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(
            json_body(second).await?,
            json!({"success": false, "message": "User with this email already exist"})
        );
        assert_eq!(users.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn missing_field_is_a_bad_request() -> Result<()> {
        let users = Arc::new(InMemoryUserRepository::new());
        let payload = json!({"name": "A", "email": "a@x.com"}).to_string();

        let response = app(users.clone()).oneshot(request(&payload)?).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await?["message"], "Missing payload");
        assert!(users.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() -> Result<()> {
        let users = Arc::new(InMemoryUserRepository::new());

        let response = app(users).oneshot(request("{not json")?).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
