//! Argument parsing for the `ingest` binary.

use clap::{Parser, Subcommand};

/// Thin operator front-end over the ingestion pipeline.
#[derive(Debug, Parser)]
#[command(name = "ingest", version, about = "Ingest files into the relational, document, and vector stores")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to `ingest.toml` (defaults to `./ingest.toml`).
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Quiet mode: only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode: debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ingest a single file.
    File(FileArgs),
    /// Ingest every regular file directly inside a directory (non-recursive).
    Dir(DirArgs),
}

#[derive(Debug, clap::Args)]
pub struct FileArgs {
    /// Path to the file to ingest.
    pub path: String,

    /// Tenant tag recorded on the catalog entry (falls back to
    /// `DEFAULT_TENANT_ID`, then `"default"`).
    #[arg(long)]
    pub tenant: Option<String>,

    /// Force a specific modality instead of auto-detecting one.
    #[arg(long, value_name = "tabular|document|image|video|audio|binary")]
    pub modality: Option<String>,

    /// Force a specific collection instead of inferring one.
    #[arg(long)]
    pub collection: Option<String>,

    /// Primary-key attribute name, for files that name their own key column.
    #[arg(long)]
    pub primary_key: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct DirArgs {
    /// Directory whose direct children should be ingested.
    pub path: String,

    /// Tenant tag recorded on every catalog entry.
    #[arg(long)]
    pub tenant: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn file_subcommand_parses_required_path() {
        let cli = Cli::try_parse_from(["ingest", "file", "report.csv"]).expect("cli should parse");
        match cli.command {
            Commands::File(args) => assert_eq!(args.path, "report.csv"),
            Commands::Dir(_) => panic!("expected Commands::File"),
        }
    }

    #[test]
    fn file_subcommand_accepts_optional_flags() {
        let cli = Cli::try_parse_from([
            "ingest",
            "file",
            "report.csv",
            "--tenant",
            "acme",
            "--modality",
            "tabular",
            "--collection",
            "reports",
            "--primary-key",
            "id",
        ])
        .expect("cli should parse");

        let Commands::File(args) = cli.command else {
            panic!("expected Commands::File");
        };
        assert_eq!(args.tenant.as_deref(), Some("acme"));
        assert_eq!(args.modality.as_deref(), Some("tabular"));
        assert_eq!(args.collection.as_deref(), Some("reports"));
        assert_eq!(args.primary_key.as_deref(), Some("id"));
    }

    #[test]
    fn dir_subcommand_parses_required_path() {
        let cli = Cli::try_parse_from(["ingest", "dir", "./incoming"]).expect("cli should parse");
        match cli.command {
            Commands::Dir(args) => assert_eq!(args.path, "./incoming"),
            Commands::File(_) => panic!("expected Commands::Dir"),
        }
    }

    #[test]
    fn global_flags_parse_before_and_after_subcommand() {
        let before = Cli::try_parse_from(["ingest", "--quiet", "file", "a.csv"]).expect("cli should parse");
        assert!(before.quiet);

        let after = Cli::try_parse_from(["ingest", "file", "a.csv", "--verbose"]).expect("cli should parse");
        assert!(after.verbose);
    }

    #[test]
    fn missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["ingest"]).is_err());
    }
}
