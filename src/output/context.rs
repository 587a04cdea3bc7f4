use serde_json::json;

use crate::core::HubContext;
use crate::error::AppError;
use crate::provision::ProvisionPolicy;

use super::format::{create_styled_table, header_cell, key_cell};

/// Resolved settings as (label, value) rows, secrets masked
fn context_rows(ctx: &HubContext) -> Result<Vec<(&'static str, String)>, AppError> {
    let credentials = if ctx.storage.has_credentials() {
        "set"
    } else {
        "not set (unsigned requests)"
    };
    Ok(vec![
        ("Tenant", ctx.tenant.to_string()),
        ("Object store", ctx.storage.endpoint.clone()),
        ("Region", ctx.storage.region.clone()),
        ("Credentials", credentials.to_string()),
        ("Artifact root", ctx.storage.artifact_root(&ctx.tenant)),
        ("Backend store", ctx.database.masked_backend_store_uri(&ctx.tenant)?),
        ("Server", format!("{} on port {}", ctx.server.executable, ctx.server.port)),
        ("Provisioning", format!("{:?}", ctx.policy)),
        ("Log base dir", ctx.logs.base_dir.display().to_string()),
        ("Log timezone", ctx.logs.timezone.label()),
    ])
}

pub(crate) fn print_context_table(ctx: &HubContext, use_color: bool) -> Result<(), AppError> {
    let mut table = create_styled_table();
    table.set_header(vec![header_cell("Setting", use_color), header_cell("Value", use_color)]);
    for (label, value) in context_rows(ctx)? {
        table.add_row(vec![key_cell(label, use_color), value.into()]);
    }
    println!("{table}");
    Ok(())
}

pub(crate) fn context_json(ctx: &HubContext) -> Result<String, AppError> {
    let value = json!({
        "tenant": ctx.tenant.as_str(),
        "storage": &ctx.storage,
        "credentials": ctx.storage.has_credentials(),
        "artifact_root": ctx.storage.artifact_root(&ctx.tenant),
        "database": &ctx.database,
        "backend_store_uri": ctx.database.masked_backend_store_uri(&ctx.tenant)?,
        "server": &ctx.server,
        "strict_provisioning": ctx.policy == ProvisionPolicy::Strict,
        "logs": {
            "base_dir": &ctx.logs.base_dir,
            "timezone": ctx.logs.timezone.label(),
        },
    });
    Ok(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()))
}
