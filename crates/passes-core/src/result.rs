use crate::errors::QueryError;
use crate::suite::{cell_as_f64, SuiteKind, DEFAULT_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// One row as returned by the results query.
#[derive(Debug, Clone, Deserialize)]
pub struct RawResultRow {
    pub id: String,
    pub test_id: String,
    pub status: String,
    #[serde(default)]
    pub step_name: Option<String>,
    #[serde(default)]
    pub typ_tags: Vec<String>,
    #[serde(default)]
    pub typ_expectations: Vec<String>,
    #[serde(default)]
    pub duration: Option<Value>,
    #[serde(default)]
    pub timeout: Option<Value>,
    #[serde(default)]
    pub expectation_files: Vec<String>,
}

impl RawResultRow {
    pub fn from_json(v: Value) -> Result<Self, QueryError> {
        serde_json::from_value(v).map_err(|e| QueryError::MalformedRow(e.to_string()))
    }

    /// True when the row satisfies the query's own selection: not skipped,
    /// and carrying at least one expectation `suite` cares about.
    pub fn is_candidate(&self, suite: &SuiteKind) -> bool {
        self.status != "SKIP"
            && self
                .typ_expectations
                .iter()
                .any(|e| suite.qualifying_expectations().contains(&e.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultStatus {
    Pass,
    Failure,
    Crash,
    Abort,
}

impl ResultStatus {
    fn from_rdb(test_id: &str, status: &str) -> Result<Self, QueryError> {
        match status {
            "PASS" => Ok(ResultStatus::Pass),
            "FAIL" => Ok(ResultStatus::Failure),
            "CRASH" => Ok(ResultStatus::Crash),
            "ABORT" => Ok(ResultStatus::Abort),
            other => Err(QueryError::BadStatus {
                test_id: test_id.to_string(),
                status: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub test_name: String,
    pub tags: Vec<String>,
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    pub build_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expectation_files: Option<Vec<PathBuf>>,
}

fn strip_prefix_from_build_id(id: &str) -> Result<String, QueryError> {
    match id.split_once('-') {
        Some(("build", rest)) if !rest.is_empty() && !rest.contains('-') => Ok(rest.to_string()),
        _ => Err(QueryError::BadBuildId(id.to_string())),
    }
}

/// Filters and normalizes one row.
///
/// `Ok(None)` means the row was excluded. Errors are upstream contract
/// violations and should abort the pass.
pub fn classify_row(suite: &SuiteKind, row: RawResultRow) -> Result<Option<TestResult>, QueryError> {
    if !row.is_candidate(suite) {
        tracing::debug!(event = "row_rejected", test_id = %row.test_id, status = %row.status);
        return Ok(None);
    }
    if suite.should_skip(&row.test_id, &row.typ_tags) {
        tracing::debug!(event = "row_skipped", test_id = %row.test_id);
        return Ok(None);
    }

    let test_name = suite.strip_prefix_from_test_id(&row.test_id)?;
    let build_id = strip_prefix_from_build_id(&row.id)?;
    let status = ResultStatus::from_rdb(&row.test_id, &row.status)?;

    let (duration, timeout) = if suite.reports_duration() {
        (
            row.duration.as_ref().and_then(cell_as_f64),
            Some(
                row.timeout
                    .as_ref()
                    .and_then(cell_as_f64)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        )
    } else {
        (None, None)
    };

    Ok(Some(TestResult {
        test_name,
        tags: row.typ_tags,
        status,
        step: row.step_name,
        build_id,
        duration,
        timeout,
        expectation_files: suite.expectation_files(&row.expectation_files),
    }))
}

/// Applies [`classify_row`] to every JSON row, keeping the included ones.
pub fn classify_rows(suite: &SuiteKind, rows: Vec<Value>) -> Result<Vec<TestResult>, QueryError> {
    let mut results = Vec::with_capacity(rows.len());
    for v in rows {
        if let Some(r) = classify_row(suite, RawResultRow::from_json(v)?)? {
            results.push(r);
        }
    }
    Ok(results)
}
