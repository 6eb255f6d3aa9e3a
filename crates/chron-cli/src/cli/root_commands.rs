use clap::{Args, Subcommand};

use chron_enrich::RunOptions;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Detect series, resolve years, and write the artefacts.
    Enrich(EnrichArgs),
    /// Print the JSON Schema for an artefact type.
    Schema(SchemaArgs),
}

/// Arguments for `chronicle enrich`.
#[derive(Clone, Debug, Default, Args)]
pub struct EnrichArgs {
    /// Compute everything but write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Ignore cached results and ask the model again
    #[arg(long)]
    pub refresh: bool,

    /// Never call the model; resolve from cache and rules only
    #[arg(long)]
    pub cache_only: bool,

    /// Do not rewrite the episode artefact
    #[arg(long)]
    pub series_only: bool,

    /// Only call the model for the series containing this episode slug
    #[arg(long, value_name = "SLUG")]
    pub slug: Option<String>,
}

impl EnrichArgs {
    #[must_use]
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            dry_run: self.dry_run,
            refresh: self.refresh,
            cache_only: self.cache_only,
            series_only: self.series_only,
            only_slug: self.slug.clone(),
        }
    }
}

/// Arguments for `chronicle schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Schema name (e.g. series, umbrella). Lists all names when omitted.
    pub name: Option<String>,
}
