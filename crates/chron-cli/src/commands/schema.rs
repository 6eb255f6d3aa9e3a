use anyhow::bail;
use chron_schema::SchemaRegistry;

use crate::cli::root_commands::SchemaArgs;
use crate::output;

/// Handle `chronicle schema`.
pub fn handle(args: &SchemaArgs) -> anyhow::Result<()> {
    let registry = SchemaRegistry::new();

    let Some(name) = args.name.as_deref() else {
        return output::print_json(&registry.list());
    };

    match registry.get(name) {
        Some(schema) => output::print_json(schema),
        None => bail!(
            "unknown schema '{name}'; available: {}",
            registry.list().join(", ")
        ),
    }
}
