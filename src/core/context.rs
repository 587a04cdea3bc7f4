//! Resolved runtime context
//!
//! Environment variables, the config file and command-line flags are merged
//! once here; both the launcher and the log directory builder take the result
//! instead of reading the environment themselves.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::config::Config;
use crate::consts::{
    DEFAULT_BUCKET, DEFAULT_IO_TIMEOUT_SECS, DEFAULT_LOG_BASE_DIR, DEFAULT_PG_DATABASE,
    DEFAULT_PG_HOST, DEFAULT_PG_PASSWORD, DEFAULT_PG_PORT, DEFAULT_PG_USER, DEFAULT_S3_ENDPOINT,
    DEFAULT_S3_REGION, DEFAULT_SERVER_EXECUTABLE, DEFAULT_SERVER_PORT, DEFAULT_STARTUP_TIMEOUT,
    DEFAULT_TENANT,
};
use crate::error::AppError;
use crate::provision::ProvisionPolicy;
use crate::utils::Timezone;

use super::tenant::TenantId;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StorageSettings {
    pub(crate) endpoint: String,
    pub(crate) bucket: String,
    pub(crate) region: String,
    #[serde(skip)]
    pub(crate) access_key: Option<String>,
    #[serde(skip)]
    pub(crate) secret_key: Option<String>,
}

impl StorageSettings {
    pub(crate) fn artifact_root(&self, tenant: &TenantId) -> String {
        format!("s3://{}/{}", self.bucket, tenant)
    }

    pub(crate) fn has_credentials(&self) -> bool {
        self.access_key.is_some() && self.secret_key.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DatabaseSettings {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) user: String,
    #[serde(skip)]
    pub(crate) password: String,
    pub(crate) name: String,
}

impl DatabaseSettings {
    /// Backend store URI for the tracking server, with the tenant's schema
    /// as the connection's search path.
    pub(crate) fn backend_store_uri(&self, tenant: &TenantId) -> Result<String, AppError> {
        self.build_uri(tenant, &self.password)
    }

    pub(crate) fn masked_backend_store_uri(&self, tenant: &TenantId) -> Result<String, AppError> {
        self.build_uri(tenant, "***")
    }

    fn build_uri(&self, tenant: &TenantId, password: &str) -> Result<String, AppError> {
        let invalid = |name: &'static str, value: &str| AppError::InvalidSetting {
            name,
            value: value.to_string(),
        };

        let mut url = Url::parse("postgresql://localhost").map_err(|_| invalid("database uri", ""))?;
        url.set_host(Some(&self.host))
            .map_err(|_| invalid("database host", &self.host))?;
        url.set_port(Some(self.port))
            .map_err(|_| invalid("database port", &self.port.to_string()))?;
        url.set_username(&self.user)
            .map_err(|_| invalid("database user", &self.user))?;
        url.set_password(Some(password))
            .map_err(|_| invalid("database password", "***"))?;
        url.set_path(&format!("/{}", self.name));
        url.set_query(Some(&format!("options=-csearch_path={tenant}")));
        Ok(url.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ServerSettings {
    pub(crate) executable: String,
    pub(crate) port: u16,
    pub(crate) startup_timeout: u64,
    pub(crate) icon_path: Option<PathBuf>,
}

impl ServerSettings {
    /// Server settings come from the config file only, never the environment
    pub(crate) fn from_config(config: &Config) -> Self {
        ServerSettings {
            executable: config
                .server
                .executable
                .clone()
                .unwrap_or_else(|| DEFAULT_SERVER_EXECUTABLE.to_string()),
            port: config.server.port.unwrap_or(DEFAULT_SERVER_PORT),
            startup_timeout: config.server.startup_timeout.unwrap_or(DEFAULT_STARTUP_TIMEOUT),
            icon_path: config.server.icon_path.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LogSettings {
    pub(crate) base_dir: PathBuf,
    pub(crate) timezone: Timezone,
}

/// Command-line values that take precedence over env and config
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) tenant: Option<String>,
    pub(crate) strict: bool,
    pub(crate) log_base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub(crate) struct HubContext {
    pub(crate) tenant: TenantId,
    pub(crate) storage: StorageSettings,
    pub(crate) database: DatabaseSettings,
    pub(crate) server: ServerSettings,
    pub(crate) logs: LogSettings,
    pub(crate) policy: ProvisionPolicy,
    pub(crate) io_timeout: Duration,
}

impl HubContext {
    pub(crate) fn from_env(config: &Config, overrides: &Overrides) -> Result<Self, AppError> {
        Self::resolve(config, overrides, |key| std::env::var(key).ok())
    }

    /// Merge defaults < config file < environment < overrides.
    /// Empty environment values count as unset.
    pub(crate) fn resolve<F>(config: &Config, overrides: &Overrides, env: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let pick = |key: &str, file: &Option<String>, default: &str| {
            var(key)
                .or_else(|| file.clone())
                .unwrap_or_else(|| default.to_string())
        };

        let raw_tenant = overrides
            .tenant
            .clone()
            .or_else(|| var("JUPYTERHUB_USER"))
            .or_else(|| config.tenant.clone())
            .unwrap_or_else(|| DEFAULT_TENANT.to_string());
        let tenant = TenantId::parse(&raw_tenant)?;

        let storage = StorageSettings {
            endpoint: pick("MLFLOW_S3_ENDPOINT_URL", &config.storage.endpoint, DEFAULT_S3_ENDPOINT),
            bucket: config
                .storage
                .bucket
                .clone()
                .unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            region: var("AWS_REGION")
                .or_else(|| var("AWS_DEFAULT_REGION"))
                .or_else(|| config.storage.region.clone())
                .unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
            access_key: var("AWS_ACCESS_KEY_ID"),
            secret_key: var("AWS_SECRET_ACCESS_KEY"),
        };

        let port = match var("POSTGRES_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| AppError::InvalidSetting {
                name: "POSTGRES_PORT",
                value: raw.clone(),
            })?,
            None => config.database.port.unwrap_or(DEFAULT_PG_PORT),
        };
        let database = DatabaseSettings {
            host: pick("POSTGRES_HOST", &config.database.host, DEFAULT_PG_HOST),
            port,
            user: pick("POSTGRES_USER", &config.database.user, DEFAULT_PG_USER),
            password: pick("POSTGRES_PASSWORD", &config.database.password, DEFAULT_PG_PASSWORD),
            name: pick("POSTGRES_DB", &config.database.name, DEFAULT_PG_DATABASE),
        };

        let server = ServerSettings::from_config(config);

        let logs = LogSettings {
            base_dir: overrides
                .log_base_dir
                .clone()
                .or_else(|| config.logs.base_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_BASE_DIR)),
            timezone: Timezone::parse(config.logs.timezone.as_deref())?,
        };

        let policy = if overrides.strict || config.strict_provisioning {
            ProvisionPolicy::Strict
        } else {
            ProvisionPolicy::BestEffort
        };

        Ok(HubContext {
            tenant,
            storage,
            database,
            server,
            logs,
            policy,
            io_timeout: Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_IO_TIMEOUT_SECS)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve_with(config: &Config, overrides: &Overrides, vars: &[(&str, &str)]) -> Result<HubContext, AppError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HubContext::resolve(config, overrides, |key| map.get(key).cloned())
    }

    #[test]
    fn defaults_reproduce_stock_deployment() {
        let ctx = resolve_with(&Config::default(), &Overrides::default(), &[]).unwrap();
        assert_eq!(ctx.tenant.as_str(), "default");
        assert_eq!(ctx.storage.endpoint, "http://minio.minio-tenant:80");
        assert_eq!(ctx.storage.artifact_root(&ctx.tenant), "s3://mlflow/default");
        assert_eq!(
            ctx.database.backend_store_uri(&ctx.tenant).unwrap(),
            "postgresql://mlflow:mlflow@db:5432/mlflow?options=-csearch_path=default"
        );
        assert_eq!(ctx.server.port, 5000);
        assert_eq!(ctx.server.startup_timeout, 20);
        assert_eq!(ctx.policy, ProvisionPolicy::BestEffort);
        assert!(!ctx.storage.has_credentials());
    }

    #[test]
    fn env_overrides_config_and_flag_overrides_env() {
        let config = Config {
            tenant: Some("from-file".to_string()),
            ..Config::default()
        };
        let vars = [("JUPYTERHUB_USER", "alice"), ("POSTGRES_HOST", "pg.internal")];

        let ctx = resolve_with(&config, &Overrides::default(), &vars).unwrap();
        assert_eq!(ctx.tenant.as_str(), "alice");
        assert_eq!(ctx.database.host, "pg.internal");

        let overrides = Overrides {
            tenant: Some("bob".to_string()),
            strict: true,
            log_base_dir: Some(PathBuf::from("/tmp/logs")),
        };
        let ctx = resolve_with(&config, &overrides, &vars).unwrap();
        assert_eq!(ctx.tenant.as_str(), "bob");
        assert_eq!(ctx.policy, ProvisionPolicy::Strict);
        assert_eq!(ctx.logs.base_dir, PathBuf::from("/tmp/logs"));
    }

    #[test]
    fn empty_env_value_counts_as_unset() {
        let ctx = resolve_with(&Config::default(), &Overrides::default(), &[("JUPYTERHUB_USER", "")]).unwrap();
        assert_eq!(ctx.tenant.as_str(), "default");
    }

    #[test]
    fn uri_follows_tenant() {
        for name in ["alice", "bob-2", "data.team"] {
            let ctx = resolve_with(&Config::default(), &Overrides::default(), &[("JUPYTERHUB_USER", name)]).unwrap();
            let uri = ctx.database.backend_store_uri(&ctx.tenant).unwrap();
            assert!(uri.ends_with(&format!("search_path={name}")), "{uri}");
            assert_eq!(ctx.storage.artifact_root(&ctx.tenant), format!("s3://mlflow/{name}"));
        }
    }

    #[test]
    fn masked_uri_hides_password() {
        let vars = [("POSTGRES_PASSWORD", "hunter2")];
        let ctx = resolve_with(&Config::default(), &Overrides::default(), &vars).unwrap();
        let masked = ctx.database.masked_backend_store_uri(&ctx.tenant).unwrap();
        assert!(!masked.contains("hunter2"));
        assert!(ctx.database.backend_store_uri(&ctx.tenant).unwrap().contains("hunter2"));
    }

    #[test]
    fn invalid_tenant_is_rejected() {
        let err = resolve_with(&Config::default(), &Overrides::default(), &[("JUPYTERHUB_USER", "x;drop")]).unwrap_err();
        assert!(matches!(err, AppError::InvalidTenant { .. }));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = resolve_with(&Config::default(), &Overrides::default(), &[("POSTGRES_PORT", "db")]).unwrap_err();
        assert_eq!(err.to_string(), r#"Invalid POSTGRES_PORT setting "db""#);
    }

    #[test]
    fn provisioning_fits_inside_startup_timeout() {
        let ctx = resolve_with(&Config::default(), &Overrides::default(), &[]).unwrap();
        // storage and schema steps each may use the full I/O timeout
        assert!(ctx.io_timeout * 2 < Duration::from_secs(ctx.server.startup_timeout));
    }

    #[test]
    fn server_settings_ignore_environment() {
        let config = Config::default();
        let server = ServerSettings::from_config(&config);
        assert_eq!(server.port, 5000);
        assert_eq!(server.executable, "mlflow");
        assert!(server.icon_path.is_none());
    }

    #[test]
    fn region_prefers_aws_region() {
        let vars = [("AWS_DEFAULT_REGION", "eu-west-1"), ("AWS_REGION", "eu-central-1")];
        let ctx = resolve_with(&Config::default(), &Overrides::default(), &vars).unwrap();
        assert_eq!(ctx.storage.region, "eu-central-1");
    }
}
