use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Alias for the integer type used for cash card IDs.
pub type CashCardId = i64;

/// An amount of money owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashCard {
    /// The ID of the card, assigned by the store and never reused.
    pub id: CashCardId,
    /// The amount of money on the card.
    pub amount: f64,
    /// The username of the user that created the card.
    pub owner: String,
}

/// The body of a request that creates or updates a cash card.
///
/// Clients may send a full [CashCard]; any `id` or `owner` field is ignored
/// since the ID comes from the URL or the store and the owner always comes
/// from the authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashCardRequest {
    /// The amount of money on the card.
    pub amount: f64,
}

/// Create the cash card table.
///
/// `AUTOINCREMENT` stops SQLite from handing out the ID of a deleted card again.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_cash_card_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS cash_card (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount REAL NOT NULL,
            owner TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_cash_card_owner ON cash_card(owner)",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_cash_card(row: &rusqlite::Row) -> Result<CashCard, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let owner = row.get(2)?;

    Ok(CashCard { id, amount, owner })
}
