//! Defines the core data models and database queries for ledger entries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, session::SessionId};

// ============================================================================
// MODELS
// ============================================================================

/// The ID of a ledger entry.
pub type EntryId = Uuid;

/// Whether an entry adds money to or takes money from a session's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money coming in.
    Credit,
    /// Money going out.
    Debit,
}

/// Apply the sign implied by `direction` to an unsigned `magnitude`.
///
/// Credits keep their magnitude and debits are negated, so that stored amounts
/// can be summed directly to get a balance.
pub fn normalize(direction: Direction, magnitude: i64) -> i64 {
    match direction {
        Direction::Credit => magnitude,
        Direction::Debit => -magnitude,
    }
}

/// A single, immutable ledger record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The ID of the entry.
    pub id: EntryId,
    /// A text description of what the entry was for.
    pub title: String,
    /// The signed amount in minor currency units.
    ///
    /// Credits are positive and debits are negative.
    pub amount: i64,
    /// The session that owns this entry.
    pub session_id: SessionId,
    /// When the entry was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A validated entry that has not been recorded yet.
///
/// To create a new `NewEntry`, use [NewEntry::new].
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    title: String,
    amount: i64,
}

impl NewEntry {
    /// Validate the parts of a new entry and normalize its amount.
    ///
    /// # Errors
    /// Returns an [Error::Validation] if `title` is empty or if `magnitude` is
    /// negative.
    pub fn new(title: &str, magnitude: i64, direction: Direction) -> Result<Self, Error> {
        if title.is_empty() {
            return Err(Error::Validation("title cannot be empty".to_owned()));
        }

        if magnitude < 0 {
            return Err(Error::Validation(format!(
                "amount must not be negative, got {magnitude}"
            )));
        }

        Ok(Self {
            title: title.to_owned(),
            amount: normalize(direction, magnitude),
        })
    }

    /// The title of the entry.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The sign-normalized amount that will be stored.
    pub fn amount(&self) -> i64 {
        self.amount
    }
}

/// The balance of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of the stored amounts of all of the session's entries.
    pub amount: i64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Record `new_entry` for `session_id` in the database.
///
/// The balance check and the insert run in one SQL transaction, so either the
/// whole entry is recorded or nothing is.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the entry would take the session's balance outside
///   of the range of a 64-bit integer,
/// - or [Error::SqlError] if there is an SQL error.
pub fn append_entry(
    session_id: SessionId,
    new_entry: NewEntry,
    connection: &Connection,
) -> Result<Entry, Error> {
    let transaction = connection.unchecked_transaction()?;

    // Every prefix of a session's entries must sum within i64, otherwise
    // SQLite's SUM fails for that session from then on.
    let balance = get_summary(session_id, &transaction)?.amount;
    if balance.checked_add(new_entry.amount).is_none() {
        return Err(Error::Validation(format!(
            "amount {} would overflow the session balance",
            new_entry.amount.unsigned_abs()
        )));
    }

    let entry = transaction
        .prepare(
            "INSERT INTO transactions (id, title, amount, session_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, title, amount, session_id, created_at",
        )?
        .query_row(
            (
                Uuid::new_v4().to_string(),
                new_entry.title,
                new_entry.amount,
                session_id,
                OffsetDateTime::now_utc(),
            ),
            map_entry_row,
        )?;

    transaction.commit()?;

    Ok(entry)
}

/// Retrieve all of the entries that belong to `session_id` in the order they
/// were recorded.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn list_entries(session_id: SessionId, connection: &Connection) -> Result<Vec<Entry>, Error> {
    connection
        .prepare(
            "SELECT id, title, amount, session_id, created_at FROM transactions
             WHERE session_id = :session_id
             ORDER BY rowid ASC",
        )?
        .query_map(&[(":session_id", &session_id)], map_entry_row)?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}

/// Retrieve the entry with `id` if it belongs to `session_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an entry of `session_id`,
///   including entries that belong to other sessions,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_entry(
    session_id: SessionId,
    id: EntryId,
    connection: &Connection,
) -> Result<Entry, Error> {
    let entry = connection
        .prepare(
            "SELECT id, title, amount, session_id, created_at FROM transactions
             WHERE id = :id AND session_id = :session_id",
        )?
        .query_row(
            rusqlite::named_params! {
                ":id": id.to_string(),
                ":session_id": session_id,
            },
            map_entry_row,
        )?;

    Ok(entry)
}

/// Get the balance of `session_id`.
///
/// A session without any entries has a balance of zero.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_summary(session_id: SessionId, connection: &Connection) -> Result<Summary, Error> {
    let amount = connection.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM transactions WHERE session_id = ?1",
        [session_id],
        |row| row.get(0),
    )?;

    Ok(Summary { amount })
}

/// Create the ledger table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_entry_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY NOT NULL,
                title TEXT NOT NULL,
                amount INTEGER NOT NULL,
                session_id TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_session_id ON transactions(session_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to an [Entry].
pub fn map_entry_row(row: &Row) -> Result<Entry, rusqlite::Error> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(error))
    })?;
    let title = row.get(1)?;
    let amount = row.get(2)?;
    let session_id = row.get(3)?;
    let created_at = row.get(4)?;

    Ok(Entry {
        id,
        title,
        amount,
        session_id,
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod normalize_tests {
    use proptest::prelude::*;

    use crate::{
        Error,
        ledger::{Direction, NewEntry, normalize},
    };

    #[test]
    fn credit_keeps_amount() {
        assert_eq!(normalize(Direction::Credit, 1000), 1000);
    }

    #[test]
    fn debit_negates_amount() {
        assert_eq!(normalize(Direction::Debit, 1000), -1000);
    }

    #[test]
    fn zero_is_zero_in_both_directions() {
        assert_eq!(normalize(Direction::Credit, 0), 0);
        assert_eq!(normalize(Direction::Debit, 0), 0);
    }

    #[test]
    fn new_entry_rejects_empty_title() {
        let result = NewEntry::new("", 100, Direction::Credit);

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn new_entry_accepts_whitespace_title() {
        let entry = NewEntry::new("   ", 100, Direction::Credit).unwrap();

        assert_eq!(entry.title(), "   ");
    }

    #[test]
    fn new_entry_rejects_negative_magnitude() {
        let result = NewEntry::new("Refund", -5, Direction::Debit);

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn new_entry_stores_debit_as_negative() {
        let entry = NewEntry::new("New transaction", 1000, Direction::Debit).unwrap();

        assert_eq!(entry.title(), "New transaction");
        assert_eq!(entry.amount(), -1000);
    }

    #[test]
    fn json_direction_is_lowercase() {
        let direction: Direction = serde_json::from_str("\"debit\"").unwrap();

        assert_eq!(direction, Direction::Debit);
        assert_eq!(serde_json::to_string(&Direction::Credit).unwrap(), "\"credit\"");
        assert!(serde_json::from_str::<Direction>("\"Debit\"").is_err());
    }

    proptest! {
        #[test]
        fn credit_and_debit_are_opposites(magnitude in 0i64..=i64::MAX) {
            let credit = normalize(Direction::Credit, magnitude);
            let debit = normalize(Direction::Debit, magnitude);

            prop_assert_eq!(credit, magnitude);
            prop_assert_eq!(credit + debit, 0);
        }

        #[test]
        fn valid_entries_are_never_rejected(
            title in "[a-zA-Z0-9]{1,32}",
            magnitude in 0i64..1_000_000_000,
            is_credit in any::<bool>(),
        ) {
            let direction = if is_credit { Direction::Credit } else { Direction::Debit };

            let entry = NewEntry::new(&title, magnitude, direction).unwrap();

            prop_assert_eq!(entry.amount().abs(), magnitude);
        }
    }
}
