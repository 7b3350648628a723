//! Hands benchmark runs to the device test launcher.

use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Launches a test command on a device and reports its exit code.
#[async_trait]
pub trait DeviceDispatcher: Send + Sync {
    async fn run_test(&self, command: &[String]) -> anyhow::Result<i32>;
}

/// Runs `program [launcher_args...] <command...>` as a child process.
#[derive(Debug, Clone)]
pub struct ProcessDispatcher {
    pub program: PathBuf,
    pub launcher_args: Vec<String>,
}

impl ProcessDispatcher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            launcher_args: Vec::new(),
        }
    }
}

#[async_trait]
impl DeviceDispatcher for ProcessDispatcher {
    async fn run_test(&self, command: &[String]) -> anyhow::Result<i32> {
        tracing::info!(
            event = "device_dispatch",
            program = %self.program.display(),
            command = ?command
        );
        let status = Command::new(&self.program)
            .args(&self.launcher_args)
            .args(command)
            .status()
            .await
            .with_context(|| format!("failed to launch {}", self.program.display()))?;
        // A signal-terminated child has no code; report it as a plain failure.
        Ok(status.code().unwrap_or(1))
    }
}

/// `<src>/tools/perf/run_benchmark`.
pub fn run_benchmark_script(chromium_src: &Path) -> PathBuf {
    chromium_src.join("tools").join("perf").join("run_benchmark")
}

/// Forwards a telemetry benchmark invocation and returns its exit code as-is.
pub async fn run_telemetry_benchmark(
    dispatcher: &dyn DeviceDispatcher,
    chromium_src: &Path,
    forwarded_args: &[String],
) -> anyhow::Result<i32> {
    let mut command = vec![run_benchmark_script(chromium_src)
        .to_string_lossy()
        .into_owned()];
    command.extend(forwarded_args.iter().cloned());
    dispatcher.run_test(&command).await
}
