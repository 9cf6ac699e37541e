#![allow(missing_docs)]

//! Shared fixtures for tests: the demo users and their cash cards.

use std::sync::{Arc, Mutex};

use axum_test::TestServer;
use rusqlite::Connection;

use crate::{
    AppState, CashCardService, PaginationConfig, SQLiteCashCardStore, build_router,
    auth::{CARD_OWNER_ROLE, PasswordHash, Principal, UserConfig, UsersConfig},
    initialize_db,
};

pub(crate) const SARAH: &str = "Sarah";
pub(crate) const KUMAR: &str = "Kumar";
pub(crate) const HANK: &str = "hank-owns-no-cards";

/// `Sarah:abc123`
pub(crate) const SARAH_AUTH: &str = "Basic U2FyYWg6YWJjMTIz";
/// `sarah:abc123`
pub(crate) const LOWERCASE_SARAH_AUTH: &str = "Basic c2FyYWg6YWJjMTIz";
/// `Kumar:xyz789`
pub(crate) const KUMAR_AUTH: &str = "Basic S3VtYXI6eHl6Nzg5";
/// `hank-owns-no-cards:qrs456`
pub(crate) const HANK_AUTH: &str = "Basic aGFuay1vd25zLW5vLWNhcmRzOnFyczQ1Ng==";
/// `Sarah:BAD-PASSWORD`
pub(crate) const BAD_PASSWORD_AUTH: &str = "Basic U2FyYWg6QkFELVBBU1NXT1JE";
/// `BAD-USER:abc123`
pub(crate) const BAD_USER_AUTH: &str = "Basic QkFELVVTRVI6YWJjMTIz";

// The minimum cost bcrypt allows, keeps the tests fast.
const TEST_HASH_COST: u32 = 4;

fn user(username: &str, password: &str, role: &str) -> UserConfig {
    UserConfig {
        username: username.to_owned(),
        password_hash: PasswordHash::from_raw_password(password, TEST_HASH_COST)
            .expect("Could not hash test password"),
        roles: vec![role.to_owned()],
    }
}

pub(crate) fn test_users_config() -> UsersConfig {
    UsersConfig {
        users: vec![
            user(SARAH, "abc123", CARD_OWNER_ROLE),
            user(HANK, "qrs456", "NON-OWNER"),
            user(KUMAR, "xyz789", CARD_OWNER_ROLE),
        ],
    }
}

pub(crate) fn principal(username: &str) -> Principal {
    Principal {
        username: username.to_owned(),
        roles: vec![CARD_OWNER_ROLE.to_owned()],
    }
}

fn seed_cash_cards(connection: &Connection) {
    connection
        .execute_batch(
            "INSERT INTO cash_card (id, amount, owner) VALUES (99, 123.45, 'Sarah');
            INSERT INTO cash_card (id, amount, owner) VALUES (100, 1.00, 'Sarah');
            INSERT INTO cash_card (id, amount, owner) VALUES (101, 150.00, 'Sarah');
            INSERT INTO cash_card (id, amount, owner) VALUES (102, 200.00, 'Kumar');",
        )
        .expect("Could not seed cash cards");
}

/// An in-memory database holding the demo cash cards.
pub(crate) fn must_create_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize_db(&connection).expect("Could not initialize database");
    seed_cash_cards(&connection);

    connection
}

pub(crate) fn must_create_test_service() -> CashCardService {
    let connection = Arc::new(Mutex::new(must_create_test_connection()));

    CashCardService::new(Arc::new(SQLiteCashCardStore::new(connection)))
}

pub(crate) fn must_create_test_state() -> AppState {
    AppState::new(
        must_create_test_connection(),
        test_users_config(),
        PaginationConfig::default(),
    )
    .expect("Could not create app state")
}

pub(crate) fn must_create_test_server() -> TestServer {
    TestServer::try_new(build_router(must_create_test_state())).expect("Could not create test server.")
}
