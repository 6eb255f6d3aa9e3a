use std::path::PathBuf;

use anyhow::{Context, bail};
use chron_config::{ChronicleConfig, PathsConfig};
use chron_llm::LlmClient;

use crate::cli::GlobalFlags;

/// Resolved paths plus the model client, if credentials are configured.
pub struct Runtime {
    pub paths: PathsConfig,
    pub client: Option<LlmClient>,
}

pub fn load(flags: &GlobalFlags) -> anyhow::Result<Runtime> {
    let root = resolve_root(flags)?;
    let config = ChronicleConfig::load_from(&root).context("failed to load chronicle configuration")?;
    let paths = config.paths.rooted(&root);

    let client = if config.model.is_configured() {
        Some(LlmClient::new(&config.model).context("failed to build model client")?)
    } else {
        tracing::debug!("no model api key configured");
        None
    };

    Ok(Runtime { paths, client })
}

fn resolve_root(flags: &GlobalFlags) -> anyhow::Result<PathBuf> {
    match &flags.root {
        Some(root) if root.is_dir() => Ok(root.clone()),
        Some(root) => bail!("invalid --root '{}': directory does not exist", root.display()),
        None => std::env::current_dir().context("failed to read current directory"),
    }
}
