//! The session-scoped ledger.
//!
//! This module contains everything related to ledger entries:
//! - The `Entry` model and the sign rule for credits and debits
//! - Database functions for recording entries and querying a session's entries and balance
//! - Route handlers that expose those functions over HTTP

mod core;
mod create_endpoint;
mod get_endpoint;
mod list_endpoint;
mod state;
mod summary_endpoint;

pub use self::core::{
    Direction, Entry, EntryId, NewEntry, Summary, append_entry, create_entry_table, get_entry,
    get_summary, list_entries, normalize,
};
pub use create_endpoint::create_entry_endpoint;
pub use get_endpoint::get_entry_endpoint;
pub use list_endpoint::list_entries_endpoint;
pub use summary_endpoint::get_summary_endpoint;
