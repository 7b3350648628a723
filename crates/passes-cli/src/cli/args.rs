use clap::{Parser, Subcommand, ValueEnum};
use passes_core::BuilderType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "unexpected-passes",
    version,
    about = "Find test expectations that no longer match real results"
)]
pub struct Cli {
    /// tracing filter, e.g. "info" or "passes_core=debug"
    #[arg(long, global = true, default_value = "warn", env = "UNEXPECTED_PASSES_LOG")]
    pub log_level: String,

    /// emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the result queries and print the filtered rows
    Query(QueryArgs),
    /// Print the query text that would be run, without running it
    ///
    /// Always shows the unsplit results query; large query mode only
    /// splits it once test ids are discovered.
    Queries(QueriesArgs),
    /// List builders that have reported results
    Builders(BuildersArgs),
    /// Forward a telemetry benchmark run to the device test launcher
    Bench(BenchArgs),
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Family {
    Gpu,
    WebTests,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SuiteArgs {
    /// result family to query
    #[arg(long, value_enum, default_value = "gpu")]
    pub family: Family,

    /// telemetry suite name (GPU only), e.g. pixel or webgl_conformance2
    #[arg(long)]
    pub suite: Option<String>,

    /// optional YAML config with project/num_samples/builders
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// reject unknown keys in --config
    #[arg(long)]
    pub strict_config: bool,

    #[arg(long)]
    pub project: Option<String>,

    /// number of recent builds to look at per builder
    #[arg(long)]
    pub num_samples: Option<usize>,

    /// discover relevant tests first and split the results queries
    #[arg(long)]
    pub large_query_mode: bool,

    #[arg(long)]
    pub bq_binary: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct QueryArgs {
    #[command(flatten)]
    pub suite: SuiteArgs,

    #[arg(long, default_value = "ci")]
    pub builder_type: BuilderType,

    /// builders to query; defaults to the config list, then to all active builders
    #[arg(long = "builder")]
    pub builders: Vec<String>,

    #[arg(long)]
    pub out: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug, Clone)]
pub struct QueriesArgs {
    #[command(flatten)]
    pub suite: SuiteArgs,

    #[arg(long, default_value = "ci")]
    pub builder_type: BuilderType,

    /// also print the test discovery and active builder queries
    #[arg(long)]
    pub all: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct BuildersArgs {
    #[command(flatten)]
    pub suite: SuiteArgs,

    #[arg(long, default_value = "ci")]
    pub builder_type: BuilderType,
}

#[derive(clap::Args, Debug, Clone)]
pub struct BenchArgs {
    /// Chromium checkout root
    #[arg(long, env = "CHROMIUM_SRC")]
    pub chromium_src: Option<PathBuf>,

    /// program that launches a test command on the device
    #[arg(long, env = "DEVICE_TEST_LAUNCHER")]
    pub launcher: PathBuf,

    /// extra args passed to the launcher before the benchmark command
    #[arg(long = "launcher-arg")]
    pub launcher_args: Vec<String>,

    /// arguments forwarded to run_benchmark
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
