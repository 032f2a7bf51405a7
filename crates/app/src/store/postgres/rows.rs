//! Row decoding.
//!
//! Enums are stored as their `as_str` text and parsed back here; a value no
//! variant matches surfaces as [`sqlx::Error::ColumnDecode`].

use std::{error::Error as StdError, str::FromStr};

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use passage::{
    checkpoints::{Checkpoint, CheckpointUuid},
    crossings::{Crossing, CrossingUuid},
    identities::{TerritoryUuid, UserUuid},
    passes::{Pass, PassKind, PassUuid, ValidityWindow},
};
use sqlx::{FromRow, Row, postgres::PgRow};

pub(super) struct PassRow(pub(super) Pass);

pub(super) struct CrossingRow(pub(super) Crossing);

pub(super) struct CheckpointRow(pub(super) Checkpoint);

fn column_error<E>(column: &str, error: E) -> sqlx::Error
where
    E: StdError + Send + Sync + 'static,
{
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(error),
    }
}

fn text<T>(row: &PgRow, column: &str) -> sqlx::Result<T>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    let value: String = row.try_get(column)?;

    value.parse().map_err(|error| column_error(column, error))
}

fn timestamp(row: &PgRow, column: &str) -> sqlx::Result<Timestamp> {
    Ok(row.try_get::<SqlxTimestamp, _>(column)?.to_jiff())
}

/// Versions are `u64` in memory and `bigint` on disk.
pub(super) fn version_param(version: u64) -> sqlx::Result<i64> {
    i64::try_from(version).map_err(|error| sqlx::Error::Encode(Box::new(error)))
}

impl<'r> FromRow<'r, PgRow> for PassRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let version: i64 = row.try_get("version")?;
        let version = u64::try_from(version).map_err(|error| column_error("version", error))?;

        let window = ValidityWindow::new(timestamp(row, "starts_at")?, timestamp(row, "ends_at")?)
            .map_err(|error| column_error("ends_at", error))?;

        Ok(Self(Pass {
            uuid: PassUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            territory_uuid: TerritoryUuid::from_uuid(row.try_get("territory_uuid")?),
            kind: PassKind::from_parts(text(row, "kind")?, row.try_get("identifier")?),
            time_type: text(row, "time_type")?,
            window,
            status: text(row, "status")?,
            expected_direction: text(row, "expected_direction")?,
            note: row.try_get("note")?,
            version,
            created_at: timestamp(row, "created_at")?,
            updated_at: timestamp(row, "updated_at")?,
        }))
    }
}

impl<'r> FromRow<'r, PgRow> for CrossingRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(Crossing {
            uuid: CrossingUuid::from_uuid(row.try_get("uuid")?),
            pass_uuid: PassUuid::from_uuid(row.try_get("pass_uuid")?),
            checkpoint_uuid: CheckpointUuid::from_uuid(row.try_get("checkpoint_uuid")?),
            direction: text(row, "direction")?,
            performed_at: timestamp(row, "performed_at")?,
        }))
    }
}

impl<'r> FromRow<'r, PgRow> for CheckpointRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(Checkpoint {
            uuid: CheckpointUuid::from_uuid(row.try_get("uuid")?),
            territory_uuid: TerritoryUuid::from_uuid(row.try_get("territory_uuid")?),
            name: row.try_get("name")?,
            checkpoint_type: text(row, "checkpoint_type")?,
        }))
    }
}
