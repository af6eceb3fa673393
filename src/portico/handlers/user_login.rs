use crate::portico::{
    handlers::{
        failure,
        types::{ErrorResponse, Session, SessionResponse, UserLogin},
        MSG_INCORRECT_CREDENTIALS, MSG_INTERNAL_ERROR, MSG_MISSING_PAYLOAD, MSG_USER_NOT_FOUND,
    },
    password::verify_password,
    repository::UserRepository,
    token::TokenIssuer,
};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

#[utoipa::path(
    post,
    path= "/login",
    request_body = UserLogin,
    responses (
        (status = 200, description = "Login successful", body = SessionResponse, content_type = "application/json"),
        (status = 400, description = "Missing or malformed payload", body = ErrorResponse),
        (status = 401, description = "Unknown email or incorrect password", body = ErrorResponse),
    ),
    tag= "login"
)]
// axum handler for login
#[instrument(skip(users, tokens, payload))]
pub async fn login(
    users: Extension<Arc<dyn UserRepository>>,
    tokens: Extension<Arc<TokenIssuer>>,
    payload: Option<Json<UserLogin>>,
) -> Response {
    let credentials: UserLogin = match payload {
        Some(Json(payload)) => payload,
        None => return failure(StatusCode::BAD_REQUEST, MSG_MISSING_PAYLOAD),
    };

    debug!("user: {:?}", credentials);

    let Some(user) = users.find_by_email(&credentials.email).await else {
        debug!("User not found");
        return failure(StatusCode::UNAUTHORIZED, MSG_USER_NOT_FOUND);
    };

    match verify_password(&credentials.password, &user.password_hash).await {
        Ok(true) => (),
        Ok(false) => {
            debug!("Incorrect credentials");
            return failure(StatusCode::UNAUTHORIZED, MSG_INCORRECT_CREDENTIALS);
        }
        Err(e) => {
            error!("Error verifying password: {:?}", e);
            return failure(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL_ERROR);
        }
    }

    match tokens.issue(&user.email, &user.name) {
        Ok(token) => {
            debug!("Login successful");

            (
                StatusCode::OK,
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
        Err(e) => {
            error!("Error issuing token: {:?}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portico::{
        password::hash_password,
        repository::{InMemoryUserRepository, User},
    };
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

    async fn app() -> Result<(Router, Arc<TokenIssuer>)> {
        let users = Arc::new(InMemoryUserRepository::new());
        users
            .insert(User {
                email: "a@x.com".to_string(),
                name: "A".to_string(),
                password_hash: hash_password("p").await?,
            })
            .await?;
        let users: Arc<dyn UserRepository> = users;
        let tokens = Arc::new(TokenIssuer::new(&SecretString::from(
            "test-secret".to_string(),
        )));

        let router = Router::new()
            .route("/login", post(login))
            .layer(Extension(users))
            .layer(Extension(tokens.clone()));

        Ok((router, tokens))
    }

    fn request(body: &Value) -> Result<Request<Body>> {
        Ok(Request::builder()
            .method("POST")
            .uri("/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?)
    }

    async fn json_body(response: Response) -> Result<Value> {
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    #[tokio::test]
    async fn correct_password_returns_verifiable_token() -> Result<()> {
        let (app, tokens) = app().await?;

        let response = app
            .oneshot(request(&json!({"email": "a@x.com", "password": "p"}))?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await?;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["email"], "a@x.com");
        assert_eq!(body["data"]["name"], "A");

        let token = body["data"]["token"].as_str().unwrap_or_default();
        let claims = tokens.verify(token)?;
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.name, "A");
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_is_incorrect_credentials() -> Result<()> {
        let (app, _) = app().await?;

        let response = app
            .oneshot(request(&json!({"email": "a@x.com", "password": "wrong"}))?)
            .await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await?,
            json!({"success": false, "message": "Incorrect Credentials"})
        );
        Ok(())
    }

    #[tokio::test]
    async fn unknown_email_is_user_not_found() -> Result<()> {
        let (app, _) = app().await?;

        let response = app
            .oneshot(request(&json!({"email": "b@x.com", "password": "p"}))?)
            .await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await?,
            json!({"success": false, "message": "User Not Found"})
        );
        Ok(())
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() -> Result<()> {
        let (app, _) = app().await?;

        let response = app
            .oneshot(request(&json!({"email": "A@X.COM", "password": "p"}))?)
            .await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await?["message"], "User Not Found");
        Ok(())
    }

    #[tokio::test]
    async fn missing_password_is_a_bad_request() -> Result<()> {
        let (app, _) = app().await?;

        let response = app.oneshot(request(&json!({"email": "a@x.com"}))?).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
