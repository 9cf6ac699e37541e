//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    Error,
    auth::{CredentialStore, UsersConfig},
    cash_card::{CashCardService, SQLiteCashCardStore},
    db::initialize,
    pagination::PaginationConfig,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The service that reads and writes cash cards on behalf of users.
    pub cash_card_service: CashCardService,

    /// The users that may log in.
    pub credentials: Arc<CredentialStore>,

    /// The config that controls how to page lists of cash cards.
    pub pagination_config: PaginationConfig,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or `users` is not a valid set of users.
    pub fn new(
        db_connection: Connection,
        users: UsersConfig,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));
        let store = SQLiteCashCardStore::new(connection);

        Ok(Self {
            cash_card_service: CashCardService::new(Arc::new(store)),
            credentials: Arc::new(CredentialStore::new(users)?),
            pagination_config,
        })
    }
}

impl FromRef<AppState> for CashCardService {
    fn from_ref(state: &AppState) -> Self {
        state.cash_card_service.clone()
    }
}
