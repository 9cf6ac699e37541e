//! Defines the endpoint for creating a new cash card.

use axum::{
    Extension, Json,
    extract::State,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    auth::Principal,
    cash_card::{CashCardService, core::CashCardRequest},
    endpoints::{self, format_endpoint},
};

/// A route handler for creating a new cash card owned by the current user.
///
/// Responds with 201 Created and a `Location` header pointing at the new card.
pub async fn create_cash_card_endpoint(
    State(service): State<CashCardService>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<CashCardRequest>,
) -> Result<Response, Error> {
    let cash_card = service.create(&request, &principal.username)?;
    let location = format_endpoint(endpoints::CASH_CARD, cash_card.id);

    Ok((StatusCode::CREATED, [(LOCATION, location)]).into_response())
}
