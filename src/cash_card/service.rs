//! The ownership rules for cash cards.

use std::sync::Arc;

use crate::{
    Error,
    cash_card::{
        core::{CashCard, CashCardId, CashCardRequest},
        store::CashCardStore,
    },
    pagination::PageRequest,
};

/// Performs cash card operations on behalf of an authenticated user.
///
/// Every operation is scoped to `owner`, the username of the caller. Cards
/// that belong to other users are reported as [Error::NotFound], exactly the
/// same as IDs that do not exist.
#[derive(Debug, Clone)]
pub struct CashCardService {
    store: Arc<dyn CashCardStore>,
}

impl CashCardService {
    /// Create a service backed by `store`.
    pub fn new(store: Arc<dyn CashCardStore>) -> Self {
        Self { store }
    }

    /// Get the card with `id` if it belongs to `owner`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the card does not exist or belongs to someone else.
    pub fn find_by_id(&self, id: CashCardId, owner: &str) -> Result<CashCard, Error> {
        self.store.get_by_id_and_owner(id, owner)
    }

    /// Get a page of `owner`'s cards.
    pub fn find_all(&self, owner: &str, page_request: &PageRequest) -> Result<Vec<CashCard>, Error> {
        self.store.list_by_owner(owner, page_request)
    }

    /// Create a card for `owner` with the amount in `request`.
    pub fn create(&self, request: &CashCardRequest, owner: &str) -> Result<CashCard, Error> {
        let cash_card = self.store.create(request.amount, owner)?;
        tracing::debug!("Created cash card {} for {}", cash_card.id, owner);

        Ok(cash_card)
    }

    /// Replace the amount on `owner`'s card with `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the card does not exist or belongs to someone else.
    pub fn update(
        &self,
        id: CashCardId,
        request: &CashCardRequest,
        owner: &str,
    ) -> Result<(), Error> {
        if !self.store.exists_by_id_and_owner(id, owner)? {
            return Err(Error::NotFound);
        }

        let cash_card = CashCard {
            id,
            amount: request.amount,
            owner: owner.to_owned(),
        };

        // The card may have been deleted since the existence check.
        match self.store.update(&cash_card)? {
            0 => Err(Error::NotFound),
            _ => Ok(()),
        }
    }

    /// Delete `owner`'s card with `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the card does not exist or belongs to someone else.
    pub fn delete(&self, id: CashCardId, owner: &str) -> Result<(), Error> {
        if !self.store.exists_by_id_and_owner(id, owner)? {
            return Err(Error::NotFound);
        }

        match self.store.delete_by_id_and_owner(id, owner)? {
            0 => Err(Error::NotFound),
            _ => {
                tracing::debug!("Deleted cash card {id} for {owner}");
                Ok(())
            }
        }
    }
}
