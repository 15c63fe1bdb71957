//! Tierlist repository: creation, default-tier bootstrap, aggregate fetch.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewTier, NewTierlist, Tier, Tierlist, TierlistAggregate};
use crate::types::StructuredColumn;
use crate::{PgError, PgResult, PooledConnection, TRACING_TARGET_QUERY, schema};

/// One aggregate query composes the tierlist with its tiers (entries
/// nested, ordered by position) and its unassigned entries. The two JSON
/// columns are normalized through [`StructuredColumn`] before they leave
/// this module.
const TIERLIST_AGGREGATE_SQL: &str = r#"
SELECT
    t.id,
    t.name,
    (
        SELECT COALESCE(json_agg(json_build_object(
            'id', ti.id,
            'tierlistId', ti.tierlist_id,
            'name', ti.name,
            'position', ti.position,
            'entries', (
                SELECT COALESCE(json_agg(json_build_object(
                    'id', e.id,
                    'tierlistId', e.tierlist_id,
                    'tierId', e.tier_id,
                    'fileKey', e.file_key
                ) ORDER BY e.id), '[]'::json)
                FROM entries e
                WHERE e.tier_id = ti.id
            )
        ) ORDER BY ti.position), '[]'::json)
        FROM tiers ti
        WHERE ti.tierlist_id = t.id
    ) AS tiers,
    (
        SELECT COALESCE(json_agg(json_build_object(
            'id', e.id,
            'tierlistId', e.tierlist_id,
            'tierId', e.tier_id,
            'fileKey', e.file_key
        ) ORDER BY e.id), '[]'::json)
        FROM entries e
        WHERE e.tierlist_id = t.id AND e.tier_id IS NULL
    ) AS unassigned_entries
FROM tierlists t
WHERE t.id = $1
"#;

#[derive(Debug, QueryableByName)]
struct TierlistAggregateRow {
    #[diesel(sql_type = diesel::sql_types::Uuid)]
    id: Uuid,
    #[diesel(sql_type = diesel::sql_types::Text)]
    name: String,
    #[diesel(sql_type = diesel::sql_types::Json)]
    tiers: serde_json::Value,
    #[diesel(sql_type = diesel::sql_types::Json)]
    unassigned_entries: serde_json::Value,
}

impl TierlistAggregateRow {
    /// Resolves the representation of both structured columns.
    fn normalize(self) -> PgResult<TierlistAggregate> {
        let tiers = normalize_column(self.tiers, "tiers")?;
        let unassigned_entries = normalize_column(self.unassigned_entries, "unassigned_entries")?;

        Ok(TierlistAggregate {
            id: self.id,
            name: self.name,
            tiers,
            unassigned_entries,
        })
    }
}

fn normalize_column(value: serde_json::Value, column: &str) -> PgResult<serde_json::Value> {
    StructuredColumn::from_value(value).normalize().map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_QUERY,
            column = %column,
            error = %err,
            "aggregate column held malformed encoded data"
        );
        PgError::Unexpected(format!("malformed {} column: {}", column, err).into())
    })
}

/// Repository for tierlist database operations.
pub trait TierlistRepository {
    /// Creates a new tierlist record.
    fn create_tierlist(
        &mut self,
        new_tierlist: NewTierlist,
    ) -> impl Future<Output = PgResult<Tierlist>> + Send;

    /// Creates a new tier record.
    fn create_tier(&mut self, new_tier: NewTier) -> impl Future<Output = PgResult<Tier>> + Send;

    /// Fetches the composed tierlist with nested tiers and unassigned
    /// entries, normalized to structured JSON.
    ///
    /// Returns `None` if the tierlist identifier does not resolve.
    fn fetch_tierlist_aggregate(
        &mut self,
        tierlist_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<TierlistAggregate>>> + Send;
}

impl TierlistRepository for PooledConnection {
    async fn create_tierlist(&mut self, new_tierlist: NewTierlist) -> PgResult<Tierlist> {
        use schema::tierlists;

        let tierlist = diesel::insert_into(tierlists::table)
            .values(&new_tierlist)
            .returning(Tierlist::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(tierlist)
    }

    async fn create_tier(&mut self, new_tier: NewTier) -> PgResult<Tier> {
        use schema::tiers;

        let tier = diesel::insert_into(tiers::table)
            .values(&new_tier)
            .returning(Tier::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(tier)
    }

    async fn fetch_tierlist_aggregate(
        &mut self,
        tierlist_id: Uuid,
    ) -> PgResult<Option<TierlistAggregate>> {
        let row = diesel::sql_query(TIERLIST_AGGREGATE_SQL)
            .bind::<diesel::sql_types::Uuid, _>(tierlist_id)
            .get_result::<TierlistAggregateRow>(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        row.map(TierlistAggregateRow::normalize).transpose()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn aggregate_row_normalizes_both_representations_identically() {
        let tiers = json!([{"id": 1, "name": "S", "position": 0, "entries": []}]);
        let unassigned = json!([{"id": 4, "tierId": null, "fileKey": "k.png"}]);
        let id = Uuid::new_v4();

        let structured = TierlistAggregateRow {
            id,
            name: "games".into(),
            tiers: tiers.clone(),
            unassigned_entries: unassigned.clone(),
        }
        .normalize()
        .unwrap();

        let text_encoded = TierlistAggregateRow {
            id,
            name: "games".into(),
            tiers: serde_json::Value::String(serde_json::to_string(&tiers).unwrap()),
            unassigned_entries: serde_json::Value::String(
                serde_json::to_string(&unassigned).unwrap(),
            ),
        }
        .normalize()
        .unwrap();

        assert_eq!(structured, text_encoded);
        assert_eq!(structured.tiers, tiers);
        assert_eq!(structured.unassigned_entries, unassigned);
    }

    #[test]
    fn aggregate_row_rejects_malformed_text_columns() {
        let row = TierlistAggregateRow {
            id: Uuid::new_v4(),
            name: "games".into(),
            tiers: serde_json::Value::String("{broken".into()),
            unassigned_entries: json!([]),
        };

        assert!(row.normalize().is_err());
    }
}
