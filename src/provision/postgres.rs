use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection};

use crate::core::{DatabaseSettings, TenantId};
use crate::error::ProvisionError;

use super::SchemaStore;

/// Tracking database reached with one short-lived connection per call
pub(crate) struct PgSchemaStore {
    host: String,
    port: u16,
    options: PgConnectOptions,
    timeout: Duration,
}

impl PgSchemaStore {
    pub(crate) fn new(settings: &DatabaseSettings, timeout: Duration) -> Self {
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.user)
            .password(&settings.password)
            .database(&settings.name)
            .disable_statement_logging();
        Self {
            host: settings.host.clone(),
            port: settings.port,
            options,
            timeout,
        }
    }

    async fn create_schema_async(&self, tenant: &TenantId) -> Result<(), ProvisionError> {
        let schema_error = |source: sqlx::Error| ProvisionError::Database {
            schema: tenant.to_string(),
            source,
        };

        let mut conn = tokio::time::timeout(self.timeout, PgConnection::connect_with(&self.options))
            .await
            .map_err(|_| ProvisionError::DatabaseTimeout {
                host: self.host.clone(),
                port: self.port,
                secs: self.timeout.as_secs(),
            })?
            .map_err(schema_error)?;

        // A bare statement on a fresh connection runs in autocommit mode
        let statement = create_schema_sql(tenant);
        let result = sqlx::query(&statement).execute(&mut conn).await;
        let closed = conn.close().await;

        result.map_err(schema_error)?;
        closed.map_err(schema_error)?;
        Ok(())
    }
}

pub(crate) fn create_schema_sql(tenant: &TenantId) -> String {
    format!("CREATE SCHEMA IF NOT EXISTS {}", tenant.quoted_identifier())
}

impl SchemaStore for PgSchemaStore {
    fn create_schema(&self, tenant: &TenantId) -> Result<(), ProvisionError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProvisionError::Runtime)?;
        runtime.block_on(self.create_schema_async(tenant))
    }
}
