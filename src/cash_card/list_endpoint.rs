//! Defines the endpoint for listing the current user's cash cards.

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use axum_extra::extract::Query;

use crate::{
    AppState, Error,
    auth::Principal,
    cash_card::{CashCardService, core::CashCard},
    pagination::{PageQuery, PaginationConfig, SortField, SortOrder},
};

/// The order cash cards are listed in when the request does not specify one.
pub const DEFAULT_SORT: [SortOrder; 1] = [SortOrder::ascending(SortField::Amount)];

/// The state needed to list cash cards.
#[derive(Debug, Clone)]
pub struct ListCashCardsState {
    /// The service for reading cash cards.
    pub service: CashCardService,
    /// The config that controls default and maximum page sizes.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ListCashCardsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            service: state.cash_card_service.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// A route handler for listing a page of the current user's cash cards as a JSON array.
///
/// Supports the query parameters `page`, `size` and `sort` (e.g. `sort=amount,desc`),
/// and sorts by amount in ascending order by default. A page with no cards is
/// an empty array rather than an error.
pub async fn list_cash_cards_endpoint(
    State(state): State<ListCashCardsState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<CashCard>>, Error> {
    let page_request = query.into_page_request(&state.pagination_config, &DEFAULT_SORT)?;

    state
        .service
        .find_all(&principal.username, &page_request)
        .map(Json)
}
