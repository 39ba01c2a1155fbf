//! Database Test Utilities
//!
//! Starts a throwaway Postgres in a testcontainer and applies the
//! søknadsbehandling schema. Setting `TEST_DATABASE_URL` skips the container
//! and uses that database instead.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

const POSTGRES_IMAGE: &str = "postgres";
const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "test_user";
const POSTGRES_PASSWORD: &str = "test_password";
const POSTGRES_DB: &str = "soknadsbehandling_test";

const SCHEMA: &str = include_str!("../../infra_db/migrations/0001_soknadsbehandling.sql");

pub type TestDbError = Box<dyn std::error::Error + Send + Sync>;

/// Connection settings for the test database
#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl TestDatabaseConfig {
    fn for_container(host: String, port: u16) -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host,
            port,
        }
    }

    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A migrated Postgres, kept alive as long as this value lives
pub struct TestDatabase {
    _container: Option<ContainerAsync<GenericImage>>,
    url: String,
    pool: PgPool,
}

impl TestDatabase {
    /// Connects to `TEST_DATABASE_URL`, or starts a container
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start, the connection
    /// cannot be made, or the schema fails to apply.
    pub async fn start() -> Result<Self, TestDbError> {
        let (container, url) = match std::env::var("TEST_DATABASE_URL") {
            Ok(url) => (None, url),
            Err(_) => {
                let container = GenericImage::new(POSTGRES_IMAGE, POSTGRES_TAG)
                    .with_exposed_port(5432.tcp())
                    .with_wait_for(WaitFor::message_on_stderr(
                        "database system is ready to accept connections",
                    ))
                    .with_env_var("POSTGRES_USER", POSTGRES_USER)
                    .with_env_var("POSTGRES_PASSWORD", POSTGRES_PASSWORD)
                    .with_env_var("POSTGRES_DB", POSTGRES_DB)
                    .start()
                    .await?;
                let port = container.get_host_port_ipv4(5432).await?;
                let host = container.get_host().await?.to_string();
                let url = TestDatabaseConfig::for_container(host, port).connection_url();
                (Some(container), url)
            }
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&url)
            .await?;
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;

        Ok(Self {
            _container: container,
            url,
            pool,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Empties every table, keeping the schema
    pub async fn clear(&self) -> Result<(), TestDbError> {
        sqlx::query("TRUNCATE TABLE soknadsbehandlinger, soknader CASCADE")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
