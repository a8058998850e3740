use clap::Parser;
use std::path::PathBuf;

/// Migrates `ResourceNormalizer` implementations to `AsyncResourceNormalizer`,
/// keeping the sync implementation as a fallback.
#[derive(Parser, Debug)]
#[command(name = "migrate", version, about, long_about = None)]
pub struct Cli {
    /// Rust source files or directories to migrate
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// TOML file overriding the names the migration looks for and emits
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print a unified diff for every changed file
    #[arg(long)]
    pub diff: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Skip blocks where the resource identifier binding is ambiguous
    #[arg(long)]
    pub strict_resource_id: bool,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_flags_and_files() {
        let cli = Cli::try_parse_from([
            "migrate",
            "--dry-run",
            "--diff",
            "-vv",
            "--config",
            "migrate.toml",
            "a.rs",
            "src/normalizers",
        ])
        .unwrap();
        assert!(cli.dry_run && cli.diff && !cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("migrate.toml")));
        assert_eq!(cli.files, vec![PathBuf::from("a.rs"), PathBuf::from("src/normalizers")]);
    }

    #[test]
    fn test_files_are_required() {
        let err = Cli::try_parse_from(["migrate"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);
    }
}
