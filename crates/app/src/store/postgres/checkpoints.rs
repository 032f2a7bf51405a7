//! Checkpoints Repository

use passage::checkpoints::{Checkpoint, CheckpointUuid};
use sqlx::{Postgres, Transaction, query, query_as};

use super::rows::CheckpointRow;

const FIND_CHECKPOINT_SQL: &str = include_str!("sql/find_checkpoint.sql");
const INSERT_CHECKPOINT_SQL: &str = include_str!("sql/insert_checkpoint.sql");

#[derive(Debug, Clone, Default)]
pub(super) struct PgCheckpointsRepository;

impl PgCheckpointsRepository {
    pub(super) async fn find_checkpoint(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        checkpoint: CheckpointUuid,
    ) -> Result<Option<Checkpoint>, sqlx::Error> {
        let row = query_as::<Postgres, CheckpointRow>(FIND_CHECKPOINT_SQL)
            .bind(checkpoint.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(row.map(|CheckpointRow(checkpoint)| checkpoint))
    }

    pub(super) async fn insert_checkpoint(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        checkpoint: &Checkpoint,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_CHECKPOINT_SQL)
            .bind(checkpoint.uuid.into_uuid())
            .bind(checkpoint.territory_uuid.into_uuid())
            .bind(checkpoint.name.as_str())
            .bind(checkpoint.checkpoint_type.as_str())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}
