mod context;
mod format;

pub(crate) use context::{context_json, print_context_table};
