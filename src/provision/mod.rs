//! Per-tenant resource provisioning
//!
//! Each tenant gets a marker object under its own prefix in the artifact
//! bucket and a schema of its own in the tracking database. Both steps are
//! create-if-absent and safe to repeat on every launch.

pub(crate) mod postgres;
pub(crate) mod s3;
mod sigv4;

use crate::core::TenantId;
use crate::error::ProvisionError;

pub(crate) use postgres::PgSchemaStore;
pub(crate) use s3::S3ObjectStore;

/// Object store capable of writing an empty marker object
pub(crate) trait ObjectStore {
    fn put_marker(&self, bucket: &str, key: &str) -> Result<(), ProvisionError>;
}

/// Database capable of creating a schema if it does not exist yet
pub(crate) trait SchemaStore {
    fn create_schema(&self, tenant: &TenantId) -> Result<(), ProvisionError>;
}

/// What a failed provisioning step means for the launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProvisionPolicy {
    /// Log failures and start the server anyway
    BestEffort,
    /// Refuse to start the server if any step failed
    Strict,
}

#[derive(Debug)]
pub(crate) enum StepOutcome {
    Provisioned,
    Failed(ProvisionError),
}

impl StepOutcome {
    pub(crate) fn is_ok(&self) -> bool {
        matches!(self, StepOutcome::Provisioned)
    }
}

impl From<Result<(), ProvisionError>> for StepOutcome {
    fn from(result: Result<(), ProvisionError>) -> Self {
        match result {
            Ok(()) => StepOutcome::Provisioned,
            Err(e) => StepOutcome::Failed(e),
        }
    }
}

/// Outcome of both provisioning steps, storage first
#[derive(Debug)]
pub(crate) struct ProvisionReport {
    pub(crate) storage: StepOutcome,
    pub(crate) schema: StepOutcome,
}

impl ProvisionReport {
    pub(crate) fn is_complete(&self) -> bool {
        self.storage.is_ok() && self.schema.is_ok()
    }

    /// First failure in step order, consuming the report
    pub(crate) fn into_first_failure(self) -> Option<ProvisionError> {
        [self.storage, self.schema]
            .into_iter()
            .find_map(|step| match step {
                StepOutcome::Failed(e) => Some(e),
                StepOutcome::Provisioned => None,
            })
    }
}

/// Object key for a prefix marker: the prefix with exactly one trailing slash
pub(crate) fn marker_key(prefix: &str) -> String {
    format!("{}/", prefix.trim_end_matches('/'))
}

pub(crate) fn ensure_storage_prefix(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
) -> StepOutcome {
    let key = marker_key(prefix);
    tracing::info!(bucket, key = %key, "creating bucket prefix");
    let outcome = StepOutcome::from(store.put_marker(bucket, &key));
    match &outcome {
        StepOutcome::Provisioned => tracing::info!(bucket, key = %key, "bucket prefix ready"),
        StepOutcome::Failed(e) => {
            tracing::warn!(bucket, key = %key, "error creating bucket prefix: {e}")
        }
    }
    outcome
}

pub(crate) fn ensure_tenant_schema(store: &dyn SchemaStore, tenant: &TenantId) -> StepOutcome {
    let outcome = StepOutcome::from(store.create_schema(tenant));
    match &outcome {
        StepOutcome::Provisioned => tracing::info!(schema = %tenant, "schema ready"),
        StepOutcome::Failed(e) => tracing::warn!(schema = %tenant, "error creating schema: {e}"),
    }
    outcome
}

/// Run both steps in order. A failed storage step never skips the schema step.
pub(crate) fn provision_tenant(
    objects: &dyn ObjectStore,
    schemas: &dyn SchemaStore,
    bucket: &str,
    tenant: &TenantId,
) -> ProvisionReport {
    let storage = ensure_storage_prefix(objects, bucket, tenant.as_str());
    let schema = ensure_tenant_schema(schemas, tenant);
    ProvisionReport { storage, schema }
}
