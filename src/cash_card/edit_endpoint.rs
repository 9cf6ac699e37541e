//! Defines the endpoint for updating a cash card.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    Error,
    auth::Principal,
    cash_card::{
        CashCardService,
        core::{CashCardId, CashCardRequest},
    },
};

/// A route handler for replacing the amount on one of the current user's cash cards.
///
/// Responds with 204 No Content on success, or 404 Not Found if the card
/// does not exist or belongs to another user.
pub async fn edit_cash_card_endpoint(
    State(service): State<CashCardService>,
    Extension(principal): Extension<Principal>,
    Path(cash_card_id): Path<CashCardId>,
    Json(request): Json<CashCardRequest>,
) -> Result<StatusCode, Error> {
    service.update(cash_card_id, &request, &principal.username)?;

    Ok(StatusCode::NO_CONTENT)
}
