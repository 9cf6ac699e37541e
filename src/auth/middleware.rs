//! Authentication middleware that checks HTTP Basic credentials and the user's role.

use std::sync::Arc;

use axum::{
    Json, RequestPartsExt,
    extract::{FromRef, Request, State},
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use serde_json::json;

use crate::{
    AppState,
    auth::{CARD_OWNER_ROLE, CredentialStore, CredentialsError},
};

/// The challenge sent to clients in the `WWW-Authenticate` header of 401 responses.
pub const BASIC_AUTH_CHALLENGE: &str = "Basic realm=\"Realm\"";

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The users that may access the API.
    pub credentials: Arc<CredentialStore>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            credentials: state.credentials.clone(),
        }
    }
}

/// Why a request was turned away by [auth_guard].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// The request had no `Authorization` header, or it was not valid HTTP Basic auth.
    MissingCredentials,
    /// The username or password was wrong.
    WrongCredentials,
    /// The user is authenticated but does not have the required role.
    Forbidden,
    /// The credentials could not be checked.
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::MissingCredentials => (StatusCode::UNAUTHORIZED, "Missing credentials"),
            AuthError::WrongCredentials => (StatusCode::UNAUTHORIZED, "Wrong credentials"),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        let mut response = (status, body).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static(BASIC_AUTH_CHALLENGE),
            );
        }

        response
    }
}

impl From<CredentialsError> for AuthError {
    fn from(error: CredentialsError) -> Self {
        match error {
            CredentialsError::BadCredentials => AuthError::WrongCredentials,
            CredentialsError::InvalidHash => AuthError::InternalError,
        }
    }
}

/// Middleware function that checks for valid HTTP Basic credentials belonging to a user with
/// the [CARD_OWNER_ROLE].
///
/// Responds with 401 Unauthorized if the credentials are missing or wrong, and 403 Forbidden
/// if the user lacks the role. Credentials are checked on every request, there are no sessions.
///
/// **Note**: Route handlers can use the function argument `Extension(principal): Extension<Principal>`
/// to receive the authenticated user.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let credentials = match parts.extract::<TypedHeader<Authorization<Basic>>>().await {
        Ok(TypedHeader(Authorization(credentials))) => credentials,
        Err(error) => {
            tracing::debug!("Rejecting request without basic auth credentials: {error}");
            return AuthError::MissingCredentials.into_response();
        }
    };

    let username = credentials.username().to_owned();
    let password = credentials.password().to_owned();
    let credential_store = state.credentials.clone();

    // bcrypt verification blocks the thread.
    let authenticated = tokio::task::spawn_blocking(move || {
        credential_store.authenticate(&username, &password)
    })
    .await;

    let principal = match authenticated {
        Ok(Ok(principal)) => principal,
        Ok(Err(error)) => {
            tracing::debug!(
                "Rejecting credentials for user {:?}: {error:?}",
                credentials.username()
            );
            return AuthError::from(error).into_response();
        }
        Err(error) => {
            tracing::error!("Password verification task failed: {error}");
            return AuthError::InternalError.into_response();
        }
    };

    if !principal.has_role(CARD_OWNER_ROLE) {
        tracing::debug!(
            "User {:?} does not have the role {CARD_OWNER_ROLE}",
            principal.username
        );
        return AuthError::Forbidden.into_response();
    }

    parts.extensions.insert(principal);
    let request = Request::from_parts(parts, body);

    next.run(request).await
}
