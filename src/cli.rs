use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::infra::config::Config;

/// Shared application context for global flags
#[derive(Clone, Debug, Default)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
    pub config: Config, // resolved promptlab.toml + PLAB_* env
}

#[derive(Parser)]
#[command(name = "plab")]
#[command(about = "Score, compare and optimize prompt templates offline")]
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

    /// Show what would be done without executing
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use this config file instead of promptlab.toml discovery
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a candidate against a reference (ROUGE, similarity, efficiency)
    Score(ScoreArgs),

    /// Score an output for faithfulness, relevance and completeness
    Evaluate(EvaluateArgs),

    /// Two-sample z-test over two score files
    Compare(CompareArgs),

    /// Evaluate paired outputs of two variants and test the difference
    AbEval(AbEvalArgs),

    /// Search for a higher scoring prompt template
    Optimize(OptimizeArgs),

    /// List builtin prompt templates
    Templates(FormatArgs),

    /// Render a named template with key=value bindings
    Render(RenderArgs),

    /// List prompt patterns
    Patterns(PatternsArgs),

    /// Show or render one prompt pattern
    Pattern(PatternArgs),

    /// Wrap a prompt with a prompting technique
    Enhance(EnhanceArgs),

    /// List task categories or show one
    Categories(CategoriesArgs),

    /// Benchmark patterns on a category's sample tasks
    Benchmark(BenchmarkArgs),

    /// Estimate token counts
    Count(CountArgs),

    /// Estimate API cost for a token budget
    Cost(CostArgs),

    /// Check a prompt for injection, blocked terms and PII
    Safety(SafetyArgs),

    /// Initialize a promptlab.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Table,
}

#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Output format
    #[arg(long, default_value = "text", value_enum)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Candidate text (@file or @- for stdin)
    pub candidate: String,

    /// Reference text (@file or @- for stdin)
    pub reference: String,

    /// Token count of the candidate; estimated when omitted
    #[arg(long)]
    pub tokens: Option<usize>,

    #[command(flatten)]
    pub out: FormatArgs,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Output to evaluate (@file or @- for stdin)
    pub output: String,

    /// Query the output answers
    #[arg(long)]
    pub query: Option<String>,

    /// Source context the output should stay faithful to
    #[arg(long)]
    pub context: Option<String>,

    /// Expected topic (repeatable)
    #[arg(long = "topic")]
    pub topics: Vec<String>,

    #[command(flatten)]
    pub out: FormatArgs,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Scores for variant A (JSON array or whitespace separated)
    #[arg(long)]
    pub a: PathBuf,

    /// Scores for variant B
    #[arg(long)]
    pub b: PathBuf,

    #[arg(long, default_value = "A")]
    pub name_a: String,

    #[arg(long, default_value = "B")]
    pub name_b: String,

    /// Significance level; defaults to config ab_test.significance_level
    #[arg(long)]
    pub alpha: Option<f64>,

    #[command(flatten)]
    pub out: FormatArgs,
}

#[derive(Args, Debug)]
pub struct AbEvalArgs {
    /// Variant A outputs, one per line or a JSON array
    #[arg(long)]
    pub outputs_a: PathBuf,

    /// Variant B outputs, paired with A
    #[arg(long)]
    pub outputs_b: PathBuf,

    /// Queries, paired with the outputs
    #[arg(long)]
    pub queries: PathBuf,

    /// Contexts, paired with the outputs
    #[arg(long)]
    pub contexts: Option<PathBuf>,

    /// faithfulness, relevance, completeness or overall
    #[arg(long)]
    pub metric: Option<String>,

    #[arg(long, default_value = "A")]
    pub name_a: String,

    #[arg(long, default_value = "B")]
    pub name_b: String,

    #[arg(long)]
    pub alpha: Option<f64>,

    #[command(flatten)]
    pub out: FormatArgs,
}

#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Starting template, and the baseline of a --pool search (@file or @- for stdin)
    pub base: String,

    /// Candidate pool for random search instead of mutation; BASE is scored first
    #[arg(long)]
    pub pool: Option<PathBuf>,

    /// Reference text candidates are scored against
    #[arg(long)]
    pub reference: String,

    /// Iteration count; defaults to config optimizer settings
    #[arg(long)]
    pub iterations: Option<usize>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub out: FormatArgs,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Template name
    pub name: String,

    /// Variable binding key=value (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,
}

#[derive(Args, Debug)]
pub struct PatternsArgs {
    /// Only patterns carrying this tag
    #[arg(long)]
    pub tag: Option<String>,

    #[command(flatten)]
    pub out: FormatArgs,
}

#[derive(Args, Debug)]
pub struct PatternArgs {
    /// Pattern name
    pub name: String,

    /// Variable binding key=value; renders the built-in example when none given
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    #[command(flatten)]
    pub out: FormatArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TechniqueKind {
    Cot,
    Role,
    FewShot,
    SelfRefine,
    Meta,
}

#[derive(Args, Debug)]
pub struct EnhanceArgs {
    /// Prompt to wrap (@file or @- for stdin)
    pub prompt: String,

    #[arg(long, value_enum)]
    pub technique: TechniqueKind,

    /// Persona for --technique role
    #[arg(long, default_value = "domain expert")]
    pub role: String,

    /// Expertise for --technique role
    #[arg(long, default_value = "this subject")]
    pub expertise: String,

    /// Tone for --technique role
    #[arg(long, default_value = "professional")]
    pub tone: String,

    /// Few-shot example INPUT=>OUTPUT (repeatable)
    #[arg(long = "example", value_name = "INPUT=>OUTPUT")]
    pub examples: Vec<String>,

    /// Use a random subset of this many examples
    #[arg(long)]
    pub shots: Option<usize>,

    /// Target task for --technique meta
    #[arg(long, default_value = "the task described below")]
    pub task: String,

    /// Constraint for --technique meta (repeatable)
    #[arg(long = "constraint")]
    pub constraints: Vec<String>,

    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct CategoriesArgs {
    /// Show one category with its sample tasks
    pub name: Option<String>,

    #[command(flatten)]
    pub out: FormatArgs,
}

#[derive(Args, Debug)]
pub struct BenchmarkArgs {
    /// Category whose sample tasks are used
    pub category: String,

    /// Pattern to include (repeatable); defaults to the category's recommendations
    #[arg(long = "pattern")]
    pub patterns: Vec<String>,

    /// Print per-pattern averages only
    #[arg(long)]
    pub summary: bool,

    #[command(flatten)]
    pub out: FormatArgs,
}

#[derive(Args, Debug)]
pub struct CountArgs {
    /// Text to count (@file or @- for stdin)
    pub text: String,

    /// Provider for the character heuristic; defaults to config tokens.provider
    #[arg(long)]
    pub provider: Option<String>,

    /// Exact BPE count with this OpenAI model or encoding (e.g. cl100k_base)
    #[arg(long)]
    pub encoding: Option<String>,

    #[command(flatten)]
    pub out: FormatArgs,
}

#[derive(Args, Debug)]
pub struct CostArgs {
    /// Input tokens
    #[arg(long)]
    pub input: usize,

    /// Output tokens
    #[arg(long)]
    pub output: usize,

    #[arg(long)]
    pub provider: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    /// Compare every priced model, cheapest first
    #[arg(long, conflicts_with_all = ["provider", "model"])]
    pub all: bool,

    #[command(flatten)]
    pub out: FormatArgs,
}

#[derive(Args, Debug)]
pub struct SafetyArgs {
    /// Text to check (@file or @- for stdin)
    pub text: String,

    /// Extra injection regex, case-insensitive (repeatable)
    #[arg(long = "pattern")]
    pub patterns: Vec<String>,

    #[command(flatten)]
    pub out: FormatArgs,
}

#[derive(Args, Debug)]
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

#[derive(Args, Debug)]
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
