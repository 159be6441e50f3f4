//! Database schema setup.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, ledger::create_entry_table};

/// Create the application tables if they do not exist.
///
/// All tables are created inside a single exclusive SQL transaction so that
/// a partially initialized database is never observed.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_entry_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
