//! Entry repository: creation and tier reassignment.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{Entry, NewEntry};
use crate::{PgError, PgResult, PooledConnection, TRACING_TARGET_QUERY, schema};

/// Repository for entry database operations.
pub trait EntryRepository {
    /// Creates a new entry record.
    ///
    /// New entries always start unassigned; the blob referenced by
    /// `file_key` must already exist in the object store (write ordering
    /// is the caller's responsibility).
    fn create_entry(&mut self, new_entry: NewEntry) -> impl Future<Output = PgResult<Entry>> + Send;

    /// Updates an entry's tier reference and returns the updated entry.
    ///
    /// `None` as the target moves the entry to the unassigned set. The
    /// target tier is not checked against the entry's tierlist; a
    /// cross-tierlist move succeeds. Returns `Ok(None)` when the entry
    /// identifier is unknown (the update affected no rows).
    fn assign_entry_tier(
        &mut self,
        entry_id: i64,
        tier_id: Option<i64>,
    ) -> impl Future<Output = PgResult<Option<Entry>>> + Send;
}

impl EntryRepository for PooledConnection {
    async fn create_entry(&mut self, new_entry: NewEntry) -> PgResult<Entry> {
        use schema::entries;

        let entry = diesel::insert_into(entries::table)
            .values(&new_entry)
            .returning(Entry::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            entry_id = entry.id,
            tierlist_id = %entry.tierlist_id,
            file_key = %entry.file_key,
            "entry created"
        );

        Ok(entry)
    }

    async fn assign_entry_tier(
        &mut self,
        entry_id: i64,
        tier_id: Option<i64>,
    ) -> PgResult<Option<Entry>> {
        use schema::entries::{self, dsl};

        let entry = diesel::update(entries::table.filter(dsl::id.eq(entry_id)))
            .set(dsl::tier_id.eq(tier_id))
            .returning(Entry::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(entry)
    }
}
