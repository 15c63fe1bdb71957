//! Database models for the tierlist catalog.

mod entry;
mod tier;
mod tierlist;

pub use entry::{Entry, NewEntry};
pub use tier::{DEFAULT_TIER_NAMES, NewTier, Tier};
pub use tierlist::{NewTierlist, Tierlist, TierlistAggregate};
