use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tierdict",
    version,
    about = "Build leveled JSONL word lists from a vocabulary table and keep packages.json in sync"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Split the source table into tier files and update the manifest
    Build(BuildArgs),
    /// Re-hash tier files and compare them with the manifest
    Verify(VerifyArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Source vocabulary table (CSV with word, translation, oxford, bnc)
    #[arg(long, env = "TIERDICT_INPUT", default_value = tierdict_core::job::DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Package manifest to update in place
    #[arg(long, env = "TIERDICT_MANIFEST", default_value = tierdict_core::job::DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Directory receiving the tier files
    #[arg(long, env = "TIERDICT_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// YAML tier plan (defaults to the built-in three-tier plan)
    #[arg(long, env = "TIERDICT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Date written to publishedAt (YYYY-MM-DD); overrides the tier plan
    #[arg(long, env = "TIERDICT_PUBLISHED_AT")]
    pub published_at: Option<chrono::NaiveDate>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Package manifest to check
    #[arg(long, env = "TIERDICT_MANIFEST", default_value = tierdict_core::job::DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Directory holding the tier files
    #[arg(long, env = "TIERDICT_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// YAML tier plan; packages it does not produce are skipped
    #[arg(long, env = "TIERDICT_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
