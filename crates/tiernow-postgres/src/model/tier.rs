//! Tier model for PostgreSQL database operations.

use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::tiers;

/// Default tier names created with every new tierlist, best first.
pub const DEFAULT_TIER_NAMES: [&str; 5] = ["S", "A", "B", "C", "D"];

/// Tier model representing one ordered bucket within a tierlist.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tiers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Tier {
    /// Unique tier identifier
    pub id: i64,
    /// Reference to the tierlist this tier belongs to
    pub tierlist_id: Uuid,
    /// Display name
    pub name: String,
    /// Order value within the tierlist, assigned sequentially at creation
    pub position: i32,
    /// Timestamp when the tier was created
    pub created_at: jiff_diesel::Timestamp,
}

/// Data for creating a new tier.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tiers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewTier {
    /// Tierlist the tier belongs to
    pub tierlist_id: Uuid,
    /// Display name
    pub name: String,
    /// Order value within the tierlist
    pub position: i32,
}
