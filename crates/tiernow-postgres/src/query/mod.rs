//! Repository traits for database operations.
//!
//! The traits are implemented on the pooled connection type so that
//! handlers can compose several operations inside a single transaction.

mod entry;
mod tierlist;

pub use entry::EntryRepository;
pub use tierlist::TierlistRepository;
