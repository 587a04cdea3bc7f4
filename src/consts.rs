/// Tenant used when `JUPYTERHUB_USER` is unset
pub(crate) const DEFAULT_TENANT: &str = "default";

/// Timestamp format for per-run log directories: "20240101-100000"
pub(crate) const LOG_STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

pub(crate) const DEFAULT_LOG_BASE_DIR: &str = "/home/jovyan/logs";
pub(crate) const DEFAULT_EXPERIMENT: &str = "experiment";

pub(crate) const DEFAULT_S3_ENDPOINT: &str = "http://minio.minio-tenant:80";
pub(crate) const DEFAULT_S3_REGION: &str = "us-east-1";
pub(crate) const DEFAULT_BUCKET: &str = "mlflow";

pub(crate) const DEFAULT_PG_HOST: &str = "db";
pub(crate) const DEFAULT_PG_PORT: u16 = 5432;
pub(crate) const DEFAULT_PG_USER: &str = "mlflow";
pub(crate) const DEFAULT_PG_PASSWORD: &str = "mlflow";
pub(crate) const DEFAULT_PG_DATABASE: &str = "mlflow";

pub(crate) const DEFAULT_SERVER_EXECUTABLE: &str = "mlflow";
pub(crate) const SERVER_BIND_HOST: &str = "0.0.0.0";
pub(crate) const DEFAULT_SERVER_PORT: u16 = 5000;
/// Seconds jupyter-server-proxy waits for the server to answer
pub(crate) const DEFAULT_STARTUP_TIMEOUT: u64 = 20;
pub(crate) const LAUNCHER_TITLE: &str = "MLflow";

/// Upper bound for object store requests and database connects. Both steps
/// together stay well under `DEFAULT_STARTUP_TIMEOUT`.
pub(crate) const DEFAULT_IO_TIMEOUT_SECS: u64 = 5;
