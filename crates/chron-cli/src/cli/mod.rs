use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::GlobalFlags;
pub use root_commands::Commands;

/// Top-level CLI parser for the `chronicle` binary.
#[derive(Debug, Parser)]
#[command(
    name = "chronicle",
    version,
    about = "Chronicle - podcast catalogue enrichment"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root holding chronicle.toml and the data directory
    #[arg(short, long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            quiet: self.quiet,
            verbose: self.verbose,
            root: self.root.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::{Cli, Commands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn enrich_flags_map_to_run_options() {
        let cli = Cli::try_parse_from([
            "chronicle",
            "enrich",
            "--dry-run",
            "--series-only",
            "--slug",
            "ep-14",
        ])
        .expect("cli should parse");

        let Commands::Enrich(args) = cli.command else {
            panic!("expected enrich");
        };
        let options = args.run_options();
        assert!(options.dry_run);
        assert!(options.series_only);
        assert!(!options.refresh);
        assert!(!options.cache_only);
        assert_eq!(options.only_slug.as_deref(), Some("ep-14"));
    }

    #[test]
    fn enrich_defaults_are_all_off() {
        let cli = Cli::try_parse_from(["chronicle", "enrich"]).expect("cli should parse");
        let Commands::Enrich(args) = cli.command else {
            panic!("expected enrich");
        };
        assert_eq!(args.run_options(), chron_enrich::RunOptions::default());
    }

    #[test]
    fn global_flags_parse_before_and_after_subcommand() {
        let before = Cli::try_parse_from(["chronicle", "--verbose", "--root", "/srv/site", "enrich"])
            .expect("cli should parse");
        assert!(before.verbose);
        assert_eq!(before.global_flags().root.as_deref(), Some(Path::new("/srv/site")));

        let after = Cli::try_parse_from(["chronicle", "enrich", "--refresh", "--quiet"])
            .expect("cli should parse");
        assert!(after.quiet);
        assert!(matches!(after.command, Commands::Enrich(ref args) if args.refresh));
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["chronicle", "-q", "-v", "enrich"]).is_err());
    }

    #[test]
    fn schema_name_is_optional() {
        let cli = Cli::try_parse_from(["chronicle", "schema"]).expect("cli should parse");
        assert!(matches!(cli.command, Commands::Schema(ref args) if args.name.is_none()));

        let cli = Cli::try_parse_from(["chronicle", "schema", "series"]).expect("cli should parse");
        assert!(matches!(cli.command, Commands::Schema(ref args) if args.name.as_deref() == Some("series")));
    }
}
