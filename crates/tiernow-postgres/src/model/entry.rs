//! Entry model for PostgreSQL database operations.

use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::entries;

/// Entry model representing one uploaded image.
///
/// The tier reference is the only field mutated after creation; a null
/// tier means the entry sits in its tierlist's unassigned set.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Entry {
    /// Unique entry identifier, assigned by the database
    pub id: i64,
    /// Reference to the tierlist this entry belongs to
    pub tierlist_id: Uuid,
    /// Reference to the tier the entry is placed in, if any
    pub tier_id: Option<i64>,
    /// Key of the image blob in the object store
    pub file_key: String,
    /// Timestamp when the entry was created
    pub created_at: jiff_diesel::Timestamp,
}

/// Data for creating a new entry.
///
/// New uploads always start unassigned; the tier reference is set later
/// through reassignment.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewEntry {
    /// Tierlist the entry belongs to
    pub tierlist_id: Uuid,
    /// Key of the image blob in the object store
    pub file_key: String,
}

impl Entry {
    /// Returns whether the entry is placed in a tier.
    pub fn is_assigned(&self) -> bool {
        self.tier_id.is_some()
    }
}
