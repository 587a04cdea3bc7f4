//! Per-tenant tracking server launcher
//!
//! Resolves the server executable, provisions the tenant's bucket prefix and
//! schema, and assembles the `mlflow server` command line bound to them.

pub(crate) mod command;
pub(crate) mod proxy;

use std::ffi::OsString;

use crate::core::HubContext;
use crate::error::AppError;
use crate::provision::{ObjectStore, ProvisionPolicy, SchemaStore, provision_tenant};
use crate::utils::find_executable;

pub(crate) use command::ServerCommand;
pub(crate) use proxy::ProxyConfig;

pub(crate) struct Launcher<'a> {
    ctx: &'a HubContext,
    objects: &'a dyn ObjectStore,
    schemas: &'a dyn SchemaStore,
    path_var: Option<OsString>,
}

impl<'a> Launcher<'a> {
    pub(crate) fn new(
        ctx: &'a HubContext,
        objects: &'a dyn ObjectStore,
        schemas: &'a dyn SchemaStore,
    ) -> Self {
        Self {
            ctx,
            objects,
            schemas,
            path_var: std::env::var_os("PATH"),
        }
    }

    /// Search this list of directories instead of the process `PATH`
    pub(crate) fn with_search_path(mut self, path_var: Option<OsString>) -> Self {
        self.path_var = path_var;
        self
    }

    /// Build the tracking server command for `port`.
    ///
    /// A missing executable is always an error. Provisioning failures are
    /// logged and only become errors under [`ProvisionPolicy::Strict`].
    pub(crate) fn build_server_command(&self, port: u16) -> Result<ServerCommand, AppError> {
        let executable = &self.ctx.server.executable;
        if find_executable(executable, self.path_var.as_deref()).is_none() {
            return Err(AppError::MissingExecutable {
                name: executable.clone(),
            });
        }

        let tenant = &self.ctx.tenant;
        tracing::info!(tenant = %tenant, "setting up MLflow");

        let report = provision_tenant(self.objects, self.schemas, &self.ctx.storage.bucket, tenant);
        if !report.is_complete() {
            match self.ctx.policy {
                ProvisionPolicy::Strict => {
                    if let Some(e) = report.into_first_failure() {
                        return Err(AppError::Provision(e));
                    }
                }
                ProvisionPolicy::BestEffort => {
                    tracing::warn!(tenant = %tenant, "provisioning incomplete, starting server anyway");
                }
            }
        }

        let backend_store = self.ctx.database.backend_store_uri(tenant)?;
        let artifact_root = self.ctx.storage.artifact_root(tenant);
        let masked_backend = self.ctx.database.masked_backend_store_uri(tenant)?;
        tracing::info!(artifact_root = %artifact_root, "artifact root");
        tracing::info!(backend_store = %masked_backend, "backend store");

        Ok(ServerCommand::tracking_server(
            executable,
            port,
            &backend_store,
            &artifact_root,
        ))
    }
}
