//! Tierlist model for PostgreSQL database operations.

use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::tierlists;

/// Tierlist model representing a named ranking board.
///
/// A tierlist owns its tiers and entries; both are deleted with it.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tierlists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Tierlist {
    /// Unique tierlist identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Timestamp when the tierlist was created
    pub created_at: jiff_diesel::Timestamp,
}

/// Data for creating a new tierlist.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tierlists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewTierlist {
    /// Unique tierlist identifier, assigned by the caller
    pub id: Uuid,
    /// Display name
    pub name: String,
}

impl NewTierlist {
    /// Creates a new tierlist record with a fresh identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Composed tierlist with its tiers (entries nested) and unassigned
/// entries, normalized to structured JSON.
///
/// Produced by the aggregate fetch; the two JSON fields are already
/// reconciled from whichever representation the store returned.
#[derive(Debug, Clone, PartialEq)]
pub struct TierlistAggregate {
    /// Unique tierlist identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Tiers ordered by position, each with its nested entries
    pub tiers: serde_json::Value,
    /// Entries not assigned to any tier
    pub unassigned_entries: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tierlist_assigns_fresh_ids() {
        let a = NewTierlist::new("games");
        let b = NewTierlist::new("games");
        assert_ne!(a.id, b.id);
        assert_eq!(a.name, "games");
    }
}
