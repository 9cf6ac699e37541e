//! Sets up the application's SQLite database.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{Error, cash_card::create_cash_card_table};

/// Create all of the database tables for the application.
///
/// Tables that already exist are left untouched, so it is safe to call this
/// on an existing database.
///
/// # Errors
/// This function may return a [Error::SqlError] if something went wrong creating the tables.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_cash_card_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), initialize(&connection));
        assert_eq!(Ok(()), initialize(&connection));
    }
}
