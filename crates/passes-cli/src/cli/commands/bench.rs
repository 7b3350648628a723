use crate::cli::args::BenchArgs;
use passes_core::device::{run_telemetry_benchmark, ProcessDispatcher};
use std::path::PathBuf;

/// Returns the launcher's exit code unchanged.
pub async fn run(args: BenchArgs) -> anyhow::Result<i32> {
    let chromium_src = match args.chromium_src {
        Some(p) => p,
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    let dispatcher = ProcessDispatcher {
        program: args.launcher,
        launcher_args: args.launcher_args,
    };
    run_telemetry_benchmark(&dispatcher, &chromium_src, &args.args).await
}
