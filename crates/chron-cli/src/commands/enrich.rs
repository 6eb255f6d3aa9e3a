use anyhow::{Context, bail};
use tokio_util::sync::CancellationToken;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::EnrichArgs;
use crate::output;

/// Handle `chronicle enrich`.
///
/// Ctrl-C cancels in-flight model calls and exits before anything is written.
pub async fn handle(args: &EnrichArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let runtime = bootstrap::load(flags)?;
    let options = args.run_options();

    let cancel = CancellationToken::new();
    let client = runtime
        .client
        .map(|client| client.with_cancellation(cancel.clone()));

    let output = tokio::select! {
        result = chron_enrich::run(&runtime.paths, client.as_ref(), &options) => {
            result.context("enrichment run failed")?
        }
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            bail!("interrupted; no artefacts were written");
        }
    };

    output::print_json(&output.summary)
}
