//! Defines the cash card store trait and a SQLite backed implementation.

use std::{
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::{Connection, params};

use crate::{
    Error,
    cash_card::core::{CashCard, CashCardId, map_row_to_cash_card},
    pagination::{PageRequest, SortField},
};

/// The number of rows changed by an update or delete.
pub type RowsAffected = usize;

/// Handles the creation, retrieval, modification and deletion of cash cards.
///
/// Stores do not check who is asking, ownership rules live in
/// [CashCardService](crate::CashCardService). Operations that take an
/// `owner` only match rows with that owner.
pub trait CashCardStore: Debug + Send + Sync {
    /// Create a new cash card with a fresh, never used ID.
    fn create(&self, amount: f64, owner: &str) -> Result<CashCard, Error>;

    /// Retrieve the cash card with `id`, whoever owns it.
    ///
    /// Request handling always goes through [get_by_id_and_owner](Self::get_by_id_and_owner);
    /// this is for checks that must see every owner's cards, such as confirming a
    /// foreign card was left untouched.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no card with `id`.
    fn get_by_id(&self, id: CashCardId) -> Result<CashCard, Error>;

    /// Retrieve the cash card with `id` if it belongs to `owner`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no card with `id` or it belongs to someone else.
    fn get_by_id_and_owner(&self, id: CashCardId, owner: &str) -> Result<CashCard, Error>;

    /// Check whether a card with `id` exists and belongs to `owner`.
    fn exists_by_id_and_owner(&self, id: CashCardId, owner: &str) -> Result<bool, Error>;

    /// Retrieve the slice of `owner`'s cards described by `page_request`.
    ///
    /// Pages past the end of the data are empty.
    fn list_by_owner(&self, owner: &str, page_request: &PageRequest)
    -> Result<Vec<CashCard>, Error>;

    /// Replace the amount of the card matching both `cash_card.id` and `cash_card.owner`.
    fn update(&self, cash_card: &CashCard) -> Result<RowsAffected, Error>;

    /// Delete the card matching both `id` and `owner`.
    fn delete_by_id_and_owner(&self, id: CashCardId, owner: &str) -> Result<RowsAffected, Error>;
}

/// Stores cash cards in a SQLite database.
///
/// The `cash_card` table must have been created, see [initialize](crate::initialize_db).
#[derive(Debug, Clone)]
pub struct SQLiteCashCardStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteCashCardStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

impl CashCardStore for SQLiteCashCardStore {
    fn create(&self, amount: f64, owner: &str) -> Result<CashCard, Error> {
        let cash_card = self
            .lock()?
            .prepare(
                "INSERT INTO cash_card (amount, owner) VALUES (?1, ?2)
                 RETURNING id, amount, owner",
            )?
            .query_row(params![amount, owner], map_row_to_cash_card)?;

        Ok(cash_card)
    }

    fn get_by_id(&self, id: CashCardId) -> Result<CashCard, Error> {
        let cash_card = self
            .lock()?
            .prepare("SELECT id, amount, owner FROM cash_card WHERE id = :id")?
            .query_row(&[(":id", &id)], map_row_to_cash_card)?;

        Ok(cash_card)
    }

    fn get_by_id_and_owner(&self, id: CashCardId, owner: &str) -> Result<CashCard, Error> {
        let cash_card = self
            .lock()?
            .prepare("SELECT id, amount, owner FROM cash_card WHERE id = ?1 AND owner = ?2")?
            .query_row(params![id, owner], map_row_to_cash_card)?;

        Ok(cash_card)
    }

    fn exists_by_id_and_owner(&self, id: CashCardId, owner: &str) -> Result<bool, Error> {
        self.lock()?
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM cash_card WHERE id = ?1 AND owner = ?2)",
                params![id, owner],
                |row| row.get(0),
            )
            .map_err(Error::from)
    }

    /// Query for a page of `owner`'s cash cards.
    ///
    /// Rows are tie-broken by ID so that pages are stable between requests.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] if there is a SQL error.
    fn list_by_owner(
        &self,
        owner: &str,
        page_request: &PageRequest,
    ) -> Result<Vec<CashCard>, Error> {
        let (Some(limit), Some(offset)) = (
            i64::try_from(page_request.size).ok(),
            page_request
                .offset()
                .and_then(|offset| i64::try_from(offset).ok()),
        ) else {
            // The page starts beyond any row SQLite could hold.
            return Ok(Vec::new());
        };

        let mut order_by_terms: Vec<String> = page_request
            .sort
            .iter()
            .map(|sort_order| sort_order.to_string())
            .collect();

        if !page_request
            .sort
            .iter()
            .any(|sort_order| sort_order.field == SortField::Id)
        {
            order_by_terms.push("id ASC".to_owned());
        }

        let query_string = format!(
            "SELECT id, amount, owner FROM cash_card WHERE owner = ?1 ORDER BY {} LIMIT ?2 OFFSET ?3",
            order_by_terms.join(", ")
        );

        self.lock()?
            .prepare(&query_string)?
            .query_map(params![owner, limit, offset], map_row_to_cash_card)?
            .map(|maybe_cash_card| maybe_cash_card.map_err(Error::from))
            .collect()
    }

    fn update(&self, cash_card: &CashCard) -> Result<RowsAffected, Error> {
        self.lock()?
            .execute(
                "UPDATE cash_card SET amount = ?1 WHERE id = ?2 AND owner = ?3",
                params![cash_card.amount, cash_card.id, cash_card.owner],
            )
            .map_err(Error::from)
    }

    fn delete_by_id_and_owner(&self, id: CashCardId, owner: &str) -> Result<RowsAffected, Error> {
        self.lock()?
            .execute(
                "DELETE FROM cash_card WHERE id = ?1 AND owner = ?2",
                params![id, owner],
            )
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod sqlite_cash_card_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{
        Error, initialize_db,
        pagination::{PageRequest, SortField, SortOrder},
    };

    use super::{CashCard, CashCardStore, SQLiteCashCardStore};

    fn get_store() -> SQLiteCashCardStore {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize_db(&connection).expect("Could not initialize database");

        SQLiteCashCardStore::new(Arc::new(Mutex::new(connection)))
    }

    fn amounts(cash_cards: &[CashCard]) -> Vec<f64> {
        cash_cards.iter().map(|cash_card| cash_card.amount).collect()
    }

    #[test]
    fn create_assigns_unique_ids() {
        let store = get_store();

        let first = store.create(1.0, "Sarah").unwrap();
        let second = store.create(2.0, "Sarah").unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.owner, "Sarah");
        assert_eq!(second.amount, 2.0);
    }

    #[test]
    fn create_does_not_reuse_deleted_ids() {
        let store = get_store();
        let deleted = store.create(1.0, "Sarah").unwrap();
        store.delete_by_id_and_owner(deleted.id, "Sarah").unwrap();

        let created = store.create(2.0, "Sarah").unwrap();

        assert_ne!(created.id, deleted.id);
    }

    #[test]
    fn get_by_id_returns_created_card() {
        let store = get_store();
        let want = store.create(250.0, "Sarah").unwrap();

        let got = store.get_by_id(want.id).unwrap();

        assert_eq!(want, got);
    }

    #[test]
    fn get_by_id_fails_on_missing_id() {
        let store = get_store();

        assert_eq!(store.get_by_id(1000), Err(Error::NotFound));
    }

    #[test]
    fn get_by_id_and_owner_checks_owner() {
        let store = get_store();
        let want = store.create(200.0, "Kumar").unwrap();

        assert_eq!(store.get_by_id_and_owner(want.id, "Kumar"), Ok(want.clone()));
        assert_eq!(
            store.get_by_id_and_owner(want.id, "Sarah"),
            Err(Error::NotFound)
        );
        assert_eq!(store.get_by_id_and_owner(1000, "Kumar"), Err(Error::NotFound));
    }

    #[test]
    fn exists_checks_owner() {
        let store = get_store();
        let cash_card = store.create(1.0, "Kumar").unwrap();

        assert_eq!(store.exists_by_id_and_owner(cash_card.id, "Kumar"), Ok(true));
        assert_eq!(store.exists_by_id_and_owner(cash_card.id, "Sarah"), Ok(false));
        assert_eq!(store.exists_by_id_and_owner(1000, "Kumar"), Ok(false));
    }

    #[test]
    fn list_only_returns_owners_cards() {
        let store = get_store();
        store.create(1.0, "Sarah").unwrap();
        store.create(2.0, "Kumar").unwrap();
        store.create(3.0, "Sarah").unwrap();
        let page_request = PageRequest::new(0, 20, vec![SortOrder::ascending(SortField::Amount)]);

        let got = store.list_by_owner("Sarah", &page_request).unwrap();

        assert_eq!(amounts(&got), vec![1.0, 3.0]);
        assert!(got.iter().all(|cash_card| cash_card.owner == "Sarah"));
    }

    #[test]
    fn list_sorts_and_pages() {
        let store = get_store();
        for amount in [123.45, 1.0, 150.0] {
            store.create(amount, "Sarah").unwrap();
        }
        let sort = vec![SortOrder::descending(SortField::Amount)];

        let first_page = store
            .list_by_owner("Sarah", &PageRequest::new(0, 2, sort.clone()))
            .unwrap();
        let second_page = store
            .list_by_owner("Sarah", &PageRequest::new(1, 2, sort))
            .unwrap();

        assert_eq!(amounts(&first_page), vec![150.0, 123.45]);
        assert_eq!(amounts(&second_page), vec![1.0]);
    }

    #[test]
    fn list_breaks_ties_by_id() {
        let store = get_store();
        let first = store.create(5.0, "Sarah").unwrap();
        let second = store.create(5.0, "Sarah").unwrap();
        let page_request = PageRequest::new(0, 20, vec![SortOrder::ascending(SortField::Amount)]);

        let got = store.list_by_owner("Sarah", &page_request).unwrap();

        assert_eq!(got, vec![first, second]);
    }

    #[test]
    fn list_past_last_page_is_empty() {
        let store = get_store();
        store.create(1.0, "Sarah").unwrap();

        let got = store
            .list_by_owner("Sarah", &PageRequest::new(5, 20, vec![]))
            .unwrap();
        let huge_page = store
            .list_by_owner("Sarah", &PageRequest::new(u64::MAX, 20, vec![]))
            .unwrap();

        assert!(got.is_empty());
        assert!(huge_page.is_empty());
    }

    #[test]
    fn update_replaces_amount_for_owner_only() {
        let store = get_store();
        let cash_card = store.create(1.0, "Kumar").unwrap();

        let wrong_owner = store
            .update(&CashCard {
                owner: "Sarah".to_owned(),
                amount: 333.33,
                ..cash_card.clone()
            })
            .unwrap();
        let right_owner = store
            .update(&CashCard {
                amount: 19.99,
                ..cash_card.clone()
            })
            .unwrap();

        assert_eq!(wrong_owner, 0);
        assert_eq!(right_owner, 1);
        assert_eq!(store.get_by_id(cash_card.id).unwrap().amount, 19.99);
    }

    #[test]
    fn delete_requires_owner() {
        let store = get_store();
        let cash_card = store.create(1.0, "Kumar").unwrap();

        assert_eq!(store.delete_by_id_and_owner(cash_card.id, "Sarah"), Ok(0));
        assert_eq!(store.delete_by_id_and_owner(cash_card.id, "Kumar"), Ok(1));
        assert_eq!(store.get_by_id(cash_card.id), Err(Error::NotFound));
    }
}
