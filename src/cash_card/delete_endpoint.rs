//! Defines the endpoint for deleting a cash card.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    Error,
    auth::Principal,
    cash_card::{CashCardService, core::CashCardId},
};

/// A route handler for deleting one of the current user's cash cards.
///
/// Responds with 204 No Content on success, or 404 Not Found if the card
/// does not exist or belongs to another user.
pub async fn delete_cash_card_endpoint(
    State(service): State<CashCardService>,
    Extension(principal): Extension<Principal>,
    Path(cash_card_id): Path<CashCardId>,
) -> Result<StatusCode, Error> {
    service.delete(cash_card_id, &principal.username)?;

    Ok(StatusCode::NO_CONTENT)
}
