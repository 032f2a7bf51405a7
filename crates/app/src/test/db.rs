//! `PostgreSQL` test databases.
//!
//! One container is started per test binary; every [`TestDb`] gets its own
//! freshly migrated database inside it, so tests never share rows.

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers_modules::{
    postgres::Postgres as PostgresImage,
    testcontainers::{ContainerAsync, runners::AsyncRunner},
};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::database;

const USER: &str = "passage_test";
const PASSWORD: &str = "passage_test_password";

static POSTGRES_CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);

async fn init_postgres_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(USER)
        .with_password(PASSWORD)
        .with_db_name("passage_test")
        .start()
        .await
        .expect("Failed to start PostgreSQL container")
}

async fn server_url() -> String {
    let container = POSTGRES_CONTAINER
        .get_or_init(init_postgres_container)
        .await;

    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get container port");

    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());

    format!("postgresql://{USER}:{PASSWORD}@{host}:{port}")
}

#[derive(Debug, Clone)]
pub(crate) struct TestDb {
    pool: PgPool,
}

impl TestDb {
    /// Create and migrate an isolated database.
    pub async fn new() -> Self {
        let server = server_url().await;
        let name = format!("passage_{}", Uuid::now_v7().simple());

        let mut admin = PgConnection::connect(&format!("{server}/postgres"))
            .await
            .expect("Failed to connect to postgres database");

        sqlx::query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut admin)
            .await
            .expect("Failed to create test database");

        admin
            .close()
            .await
            .expect("Failed to close admin connection");

        let pool = PgPool::connect(&format!("{server}/{name}"))
            .await
            .expect("Failed to create pool for test database");

        database::migrate(&pool)
            .await
            .expect("Failed to run migrations on test database");

        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrated_database_has_pass_tables() {
        let test_db = TestDb::new().await;

        let tables: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM information_schema.tables \
             WHERE table_name IN ('passes', 'crossings', 'checkpoints', 'territory_relations')",
        )
        .fetch_one(test_db.pool())
        .await
        .expect("Failed to query information schema");

        assert_eq!(tables, 4);
    }
}
