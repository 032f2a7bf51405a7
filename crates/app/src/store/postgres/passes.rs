//! Passes Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use passage::{
    identities::{TerritoryUuid, UserUuid},
    passes::{Pass, PassUuid},
};
use sqlx::{Postgres, Transaction, query, query_as, query_scalar};

use super::rows::{PassRow, version_param};

const FIND_PASS_SQL: &str = include_str!("sql/find_pass.sql");
const LIST_USER_PASSES_SQL: &str = include_str!("sql/list_user_passes.sql");
const LIST_TERRITORY_PASSES_SQL: &str = include_str!("sql/list_territory_passes.sql");
const LIST_ELAPSED_ACTIVE_PASSES_SQL: &str = include_str!("sql/list_elapsed_active_passes.sql");
const HAS_TERRITORY_RELATION_SQL: &str = include_str!("sql/has_territory_relation.sql");
const GRANT_TERRITORY_SQL: &str = include_str!("sql/grant_territory.sql");
const LOCK_USER_PASSES_SQL: &str = include_str!("sql/lock_user_passes.sql");
const INSERT_PASS_SQL: &str = include_str!("sql/insert_pass.sql");
const UPDATE_PASS_SQL: &str = include_str!("sql/update_pass.sql");

#[derive(Debug, Clone, Default)]
pub(super) struct PgPassesRepository;

impl PgPassesRepository {
    pub(super) async fn find_pass(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        pass: PassUuid,
    ) -> Result<Option<Pass>, sqlx::Error> {
        let row = query_as::<Postgres, PassRow>(FIND_PASS_SQL)
            .bind(pass.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(row.map(|PassRow(pass)| pass))
    }

    pub(super) async fn list_user_passes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<Pass>, sqlx::Error> {
        let rows = query_as::<Postgres, PassRow>(LIST_USER_PASSES_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|PassRow(pass)| pass).collect())
    }

    pub(super) async fn list_territory_passes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        territory: TerritoryUuid,
    ) -> Result<Vec<Pass>, sqlx::Error> {
        let rows = query_as::<Postgres, PassRow>(LIST_TERRITORY_PASSES_SQL)
            .bind(territory.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|PassRow(pass)| pass).collect())
    }

    pub(super) async fn list_elapsed_active_passes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        now: Timestamp,
    ) -> Result<Vec<Pass>, sqlx::Error> {
        let rows = query_as::<Postgres, PassRow>(LIST_ELAPSED_ACTIVE_PASSES_SQL)
            .bind(SqlxTimestamp::from(now))
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|PassRow(pass)| pass).collect())
    }

    pub(super) async fn has_territory_relation(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        territory: TerritoryUuid,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(HAS_TERRITORY_RELATION_SQL)
            .bind(user.into_uuid())
            .bind(territory.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(super) async fn grant_territory(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        territory: TerritoryUuid,
    ) -> Result<(), sqlx::Error> {
        query(GRANT_TERRITORY_SQL)
            .bind(user.into_uuid())
            .bind(territory.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Serialise writes to one user's passes until the transaction ends.
    pub(super) async fn lock_user_passes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<(), sqlx::Error> {
        query(LOCK_USER_PASSES_SQL)
            .bind(user.into_uuid().to_string())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(super) async fn insert_pass(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        pass: &Pass,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_PASS_SQL)
            .bind(pass.uuid.into_uuid())
            .bind(pass.user_uuid.into_uuid())
            .bind(pass.territory_uuid.into_uuid())
            .bind(pass.kind.tag().as_str())
            .bind(pass.kind.identifier())
            .bind(pass.time_type.as_str())
            .bind(SqlxTimestamp::from(pass.window.start()))
            .bind(SqlxTimestamp::from(pass.window.end()))
            .bind(pass.status.as_str())
            .bind(pass.expected_direction.as_str())
            .bind(pass.note.as_deref())
            .bind(version_param(pass.version)?)
            .bind(SqlxTimestamp::from(pass.created_at))
            .bind(SqlxTimestamp::from(pass.updated_at))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Write `pass` over the stored row if it is still at `expected_version`.
    /// Returns the number of rows written.
    pub(super) async fn update_pass(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        pass: &Pass,
        expected_version: u64,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_PASS_SQL)
            .bind(pass.uuid.into_uuid())
            .bind(SqlxTimestamp::from(pass.window.start()))
            .bind(SqlxTimestamp::from(pass.window.end()))
            .bind(pass.status.as_str())
            .bind(pass.expected_direction.as_str())
            .bind(pass.note.as_deref())
            .bind(version_param(pass.version)?)
            .bind(SqlxTimestamp::from(pass.updated_at))
            .bind(version_param(expected_version)?)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}
