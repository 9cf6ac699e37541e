//! Cash Card is a small REST API for managing cash cards: amounts of money
//! that belong to a single owner.
//!
//! Every route under `/cashcards` is protected by HTTP Basic authentication
//! and scoped to the authenticated user. An owner can only ever see, change
//! or delete their own cards, and a card owned by someone else looks exactly
//! like a card that does not exist.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod cash_card;
mod db;
mod endpoints;
mod logging;
mod pagination;
mod routing;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    AuthError, CARD_OWNER_ROLE, CredentialStore, PasswordHash, Principal, UserConfig, UsersConfig,
};
pub use cash_card::{
    CashCard, CashCardId, CashCardRequest, CashCardService, CashCardStore, SQLiteCashCardStore,
};
pub use db::initialize as initialize_db;
pub use endpoints::{CASH_CARD, CASH_CARDS, format_endpoint};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::{PageRequest, PaginationConfig, SortDirection, SortField, SortOrder};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// This is also returned when the resource exists but belongs to another
    /// user, so that clients cannot probe for IDs they do not own.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The `sort` query parameter could not be parsed.
    #[error("invalid sort parameter: {0}")]
    InvalidSort(String),

    /// The users config file could not be read or contained invalid data.
    #[error("invalid users config: {0}")]
    InvalidUsersConfig(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            // Not found responses carry no body, there is nothing useful to say.
            Error::NotFound => StatusCode::NOT_FOUND.into_response(),
            Error::InvalidSort(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "An unexpected error occurred, check the server logs for more details."
                    })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};

    use crate::Error;

    #[tokio::test]
    async fn not_found_has_empty_body() {
        let response = Error::NotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn invalid_sort_is_bad_request() {
        let response = Error::InvalidSort("foo".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let response = Error::HashingError("secret detail".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8_lossy(&body);
        assert!(!body.contains("secret detail"), "got body {body}");
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }
}
