pub(crate) mod context;
pub(crate) mod tenant;

pub(crate) use context::{DatabaseSettings, HubContext, Overrides, ServerSettings, StorageSettings};
pub(crate) use tenant::TenantId;
