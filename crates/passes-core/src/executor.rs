use crate::errors::QueryError;
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// `bq` refuses to return more rows than this unless told otherwise.
pub const MAX_ROWS: u64 = (1 << 31) - 1;

/// Values bound to `@builder_name` / `@num_builds` in the query text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    pub builder_name: Option<String>,
    pub num_builds: Option<usize>,
}

impl QueryParameters {
    pub fn for_builder(builder: &str) -> Self {
        Self {
            builder_name: Some(builder.to_string()),
            num_builds: None,
        }
    }

    pub fn with_num_builds(mut self, n: usize) -> Self {
        self.num_builds = Some(n);
        self
    }

    /// Renders the parameters as `bq --parameter` values.
    pub fn to_bq_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(b) = &self.builder_name {
            args.push(format!("--parameter=builder_name::{}", b));
        }
        if let Some(n) = self.num_builds {
            args.push(format!("--parameter=num_builds:INT64:{}", n));
        }
        args
    }
}

/// Runs query text against the results datastore and returns its JSON rows.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn run_json(&self, query: &str, params: &QueryParameters) -> anyhow::Result<Vec<Value>>;
}

/// Executes queries with the `bq` command line tool.
#[derive(Debug, Clone)]
pub struct BqExecutor {
    binary: String,
    project: String,
}

impl BqExecutor {
    pub fn new(binary: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            project: project.into(),
        }
    }

    pub fn command_args(&self, params: &QueryParameters) -> Vec<String> {
        let mut args = vec![
            "query".to_string(),
            format!("--max_rows={}", MAX_ROWS),
            "--format=json".to_string(),
            format!("--project_id={}", self.project),
            "--use_legacy_sql=false".to_string(),
        ];
        args.extend(params.to_bq_args());
        args
    }
}

#[async_trait]
impl QueryExecutor for BqExecutor {
    async fn run_json(&self, query: &str, params: &QueryParameters) -> anyhow::Result<Vec<Value>> {
        let args = self.command_args(params);
        tracing::debug!(event = "bq_query", binary = %self.binary, args = ?args);

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| QueryError::Executor(format!("failed to spawn {}: {}", self.binary, e)))?;

        // bq may exit before reading all of stdin, so feed it while waiting.
        let stdin = child.stdin.take();
        let send = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(query.as_bytes()).await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let (sent, output) = tokio::join!(send, child.wait_with_output());
        let output = output
            .map_err(|e| QueryError::Executor(format!("failed to wait for {}: {}", self.binary, e)))?;

        if !output.status.success() {
            return Err(QueryError::Executor(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))
            .into());
        }
        sent.map_err(|e| QueryError::Executor(format!("failed to send query to {}: {}", self.binary, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<Value> = serde_json::from_str(&stdout)
            .map_err(|e| QueryError::Executor(format!("unparseable bq output: {}", e)))?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bq_args() {
        let exec = BqExecutor::new("bq", "chrome-unexpected-pass-data");
        let args = exec.command_args(&QueryParameters::for_builder("Linux Release").with_num_builds(100));
        assert_eq!(
            args,
            vec![
                "query",
                "--max_rows=2147483647",
                "--format=json",
                "--project_id=chrome-unexpected-pass-data",
                "--use_legacy_sql=false",
                "--parameter=builder_name::Linux Release",
                "--parameter=num_builds:INT64:100",
            ]
        );
    }

    #[test]
    fn test_no_params() {
        assert!(QueryParameters::default().to_bq_args().is_empty());
    }

    #[cfg(unix)]
    fn fake_bq(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("bq");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_early_exit_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let exec = BqExecutor::new(fake_bq(dir.path(), "echo 'Access Denied' >&2\nexit 1"), "p");
        let query = "x".repeat(512 * 1024);

        let err = exec
            .run_json(&query, &QueryParameters::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Access Denied"), "got: {}", err);
        assert!(matches!(
            err.downcast_ref::<QueryError>(),
            Some(QueryError::Executor(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_rows_from_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let exec = BqExecutor::new(
            fake_bq(dir.path(), "cat > /dev/null\necho '[{\"builder_name\": \"a\"}]'"),
            "p",
        );
        let rows = exec
            .run_json("SELECT 1", &QueryParameters::default())
            .await
            .unwrap();
        assert_eq!(rows, vec![serde_json::json!({"builder_name": "a"})]);
    }
}
