//! Crossings Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use passage::{crossings::Crossing, passes::PassUuid};
use sqlx::{Postgres, Transaction, query, query_as};

use super::rows::CrossingRow;

const LIST_PASS_CROSSINGS_SQL: &str = include_str!("sql/list_pass_crossings.sql");
const FIND_LATEST_CROSSING_SQL: &str = include_str!("sql/find_latest_crossing.sql");
const INSERT_CROSSING_SQL: &str = include_str!("sql/insert_crossing.sql");

#[derive(Debug, Clone, Default)]
pub(super) struct PgCrossingsRepository;

impl PgCrossingsRepository {
    pub(super) async fn list_pass_crossings(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        pass: PassUuid,
    ) -> Result<Vec<Crossing>, sqlx::Error> {
        let rows = query_as::<Postgres, CrossingRow>(LIST_PASS_CROSSINGS_SQL)
            .bind(pass.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows.into_iter().map(|CrossingRow(crossing)| crossing).collect())
    }

    pub(super) async fn find_latest_crossing(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        pass: PassUuid,
    ) -> Result<Option<Crossing>, sqlx::Error> {
        let row = query_as::<Postgres, CrossingRow>(FIND_LATEST_CROSSING_SQL)
            .bind(pass.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(row.map(|CrossingRow(crossing)| crossing))
    }

    pub(super) async fn insert_crossing(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        crossing: &Crossing,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_CROSSING_SQL)
            .bind(crossing.uuid.into_uuid())
            .bind(crossing.pass_uuid.into_uuid())
            .bind(crossing.checkpoint_uuid.into_uuid())
            .bind(crossing.direction.as_str())
            .bind(SqlxTimestamp::from(crossing.performed_at))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}
