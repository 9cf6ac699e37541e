//! Application router configuration.

use axum::{Router, middleware, routing::get};

use crate::{
    AppState, Error,
    auth::auth_guard,
    cash_card::{
        create_cash_card_endpoint, delete_cash_card_endpoint, edit_cash_card_endpoint,
        get_cash_card_endpoint, list_cash_cards_endpoint,
    },
    endpoints,
};

/// The cash card collection, relative to [endpoints::CASH_CARDS].
const COLLECTION: &str = "/";
/// A single cash card, relative to [endpoints::CASH_CARDS].
const MEMBER: &str = "/{cash_card_id}";

/// Return a router with all the app's routes.
///
/// Every request under [endpoints::CASH_CARDS] goes through [auth_guard],
/// including requests for unknown paths or unsupported methods.
pub fn build_router(state: AppState) -> Router {
    let cash_card_routes = Router::new()
        .route(
            COLLECTION,
            get(list_cash_cards_endpoint).post(create_cash_card_endpoint),
        )
        .route(
            MEMBER,
            get(get_cash_card_endpoint)
                .put(edit_cash_card_endpoint)
                .delete(delete_cash_card_endpoint),
        )
        .fallback(cash_card_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    Router::new()
        .nest(endpoints::CASH_CARDS, cash_card_routes)
        .with_state(state)
}

async fn cash_card_not_found() -> Error {
    Error::NotFound
}
