use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "retread")]
#[command(
    about = "A deterministic sentence-alignment and diff-leverage engine for recycling translated content"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress bars and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Run without writing any output files
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sentence-align a source document against its translation
    Align(AlignArgs),

    /// Leverage translations from an old document tree into a new one
    Leverage(LeverageArgs),

    /// Initialize a retread.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser)]
pub struct AlignArgs {
    /// Source-language document (plain text, one paragraph per line)
    pub source: String,

    /// Target-language document read in lockstep with the source
    pub target: String,

    /// Locale tag to store the aligned translation under
    #[arg(long, default_value = "fr")]
    pub target_locale: String,

    /// Emit only 1-1 pairs, discarding inserts/deletes/multi-matches
    #[arg(long)]
    pub one_to_one: bool,

    /// Pair segments positionally instead of running the aligner
    #[arg(long)]
    pub force_simple: bool,

    /// Collapse whitespace runs before aligning
    #[arg(long)]
    pub collapse_whitespace: bool,

    /// Emit single-line JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,

    /// Output file; prints to stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct LeverageArgs {
    /// Root of the new document revision
    pub new_root: String,

    /// Root of the old revision's source documents
    pub old_root: String,

    /// Root of the old revision's translated documents (aligned by
    /// relative path with the old source tree)
    #[arg(long = "old-target")]
    pub old_target_root: Option<String>,

    /// Locale tag the leveraged translations belong to
    #[arg(long, default_value = "fr")]
    pub target_locale: String,

    /// Fuzzy threshold 1-100 (100 = exact only); overrides the config file
    #[arg(long)]
    pub threshold: Option<u8>,

    /// Only mark matches for review; copy nothing
    #[arg(long)]
    pub diff_only: bool,

    /// Overwrite target content with the leveraged text
    #[arg(long)]
    pub copy_to_target: bool,

    /// Match file paths case-insensitively
    #[arg(long)]
    pub case_insensitive: bool,

    /// Additional glob patterns to ignore while walking the trees
    #[arg(short, long)]
    pub ignore: Vec<String>,

    /// Report file path
    #[arg(short, long, default_value = "leverage-report.json")]
    pub output: String,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
