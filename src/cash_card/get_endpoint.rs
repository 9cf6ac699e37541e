//! Defines the endpoint for fetching a single cash card.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error,
    auth::Principal,
    cash_card::{CashCardService, core::CashCard, core::CashCardId},
};

/// A route handler for getting one of the current user's cash cards as JSON.
///
/// Responds with 404 Not Found if the card does not exist or belongs to
/// another user.
pub async fn get_cash_card_endpoint(
    State(service): State<CashCardService>,
    Extension(principal): Extension<Principal>,
    Path(cash_card_id): Path<CashCardId>,
) -> Result<Json<CashCard>, Error> {
    service
        .find_by_id(cash_card_id, &principal.username)
        .map(Json)
}
