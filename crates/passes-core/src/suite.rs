use crate::errors::QueryError;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Root of the web tests, relative to a Chromium checkout.
pub const WEB_TEST_ROOT_DIR: &str = "third_party/blink/web_tests";

/// Timeout (seconds) assumed for web tests that do not report their own.
pub const DEFAULT_TIMEOUT_SECS: f64 = 6.0;

pub const KNOWN_WEB_TEST_ID_PREFIXES: [&str; 2] = [
    "ninja://:blink_web_tests/",
    "ninja://:webgpu_blink_web_tests/",
];

const WEBGPU_CTS_MARKER: &str = "webgpu/cts.html";

/// Telemetry suites whose ResultDB name is not `<suite>_integration_test`.
const TELEMETRY_TO_RDB_SUITE_EXCEPTIONS: [(&str, &str); 3] = [
    ("info_collection", "info_collection_test"),
    ("power", "power_measurement_integration_test"),
    ("trace_test", "trace_integration_test"),
];

/// A GPU integration test suite as reported to ResultDB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuSuite {
    rdb_suite: String,
    webgl_version_tag: Option<String>,
}

impl GpuSuite {
    /// Maps the telemetry suite name to the one typ reports.
    ///
    /// WebGL 1 and 2 conformance share a suite but not an expectation file,
    /// so `webgl_conformanceN` keeps N as a required `webgl-version-N` tag.
    pub fn new(telemetry_suite: &str) -> Self {
        let (suite, webgl_version_tag) = if telemetry_suite.contains("webgl_conformance") {
            let version = telemetry_suite
                .chars()
                .last()
                .map(String::from)
                .unwrap_or_default();
            (
                "webgl_conformance".to_string(),
                Some(format!("webgl-version-{}", version)),
            )
        } else {
            (telemetry_suite.to_string(), None)
        };

        let rdb_suite = match TELEMETRY_TO_RDB_SUITE_EXCEPTIONS
            .iter()
            .find(|(telemetry, _)| *telemetry == suite)
        {
            Some((_, mapped)) => mapped.to_string(),
            None => format!("{}_integration_test", suite),
        };

        Self {
            rdb_suite,
            webgl_version_tag,
        }
    }

    pub fn rdb_suite(&self) -> &str {
        &self.rdb_suite
    }

    pub fn webgl_version_tag(&self) -> Option<&str> {
        self.webgl_version_tag.as_deref()
    }
}

/// The two result families the analyzers know how to query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuiteKind {
    Gpu(GpuSuite),
    WebTests,
}

impl SuiteKind {
    pub fn gpu(telemetry_suite: &str) -> Self {
        SuiteKind::Gpu(GpuSuite::new(telemetry_suite))
    }

    /// Name of the suite as it appears in ResultDB.
    pub fn name(&self) -> &str {
        match self {
            SuiteKind::Gpu(suite) => suite.rdb_suite(),
            SuiteKind::WebTests => "blink_web_tests",
        }
    }

    /// Table name component: `chrome-luci-data.chromium.<family>_<type>_test_results`.
    pub fn table_family(&self) -> &'static str {
        match self {
            SuiteKind::Gpu(_) => "gpu",
            SuiteKind::WebTests => "blink_web_tests",
        }
    }

    /// Expectations that make a result worth looking at.
    pub fn qualifying_expectations(&self) -> &'static [&'static str] {
        match self {
            SuiteKind::Gpu(_) => &["Failure", "RetryOnFailure"],
            SuiteKind::WebTests => &["Failure", "Crash", "Timeout"],
        }
    }

    /// Clause used by the fixed generator. Web tests look at every test.
    pub fn fixed_filter_clause(&self) -> String {
        match self {
            SuiteKind::Gpu(suite) => format!(
                "AND REGEXP_CONTAINS(\n        test_id,\n        r\"gpu_tests\\.{}\\.\")",
                suite.rdb_suite()
            ),
            SuiteKind::WebTests => String::new(),
        }
    }

    /// Restricts discovery queries to rows carrying the suite's typ tag.
    ///
    /// Only WebGL conformance needs this; everything else returns "".
    pub fn suite_filter_clause(&self) -> String {
        match self {
            SuiteKind::Gpu(suite) => match suite.webgl_version_tag() {
                Some(tag) => format!("AND \"{}\" IN UNNEST(typ_tags)", tag),
                None => String::new(),
            },
            SuiteKind::WebTests => String::new(),
        }
    }

    pub fn should_skip(&self, test_id: &str, typ_tags: &[String]) -> bool {
        match self {
            SuiteKind::Gpu(suite) => match suite.webgl_version_tag() {
                Some(tag) => !typ_tags.iter().any(|t| t == tag),
                None => false,
            },
            // WebGPU CTS results are not supported.
            SuiteKind::WebTests => test_id.contains(WEBGPU_CTS_MARKER),
        }
    }

    /// Recovers the name the test runner knows a test by.
    pub fn strip_prefix_from_test_id(&self, test_id: &str) -> Result<String, QueryError> {
        match self {
            SuiteKind::Gpu(_) => {
                // ninja://<target>/gpu_tests.<suite>.<class>.<name>
                let parts: Vec<&str> = test_id.splitn(4, '.').collect();
                if parts.len() != 4 || parts[3].is_empty() {
                    return Err(QueryError::UnknownTestIdPrefix(test_id.to_string()));
                }
                Ok(parts[3].to_string())
            }
            SuiteKind::WebTests => KNOWN_WEB_TEST_ID_PREFIXES
                .iter()
                .find_map(|prefix| test_id.strip_prefix(prefix))
                .map(String::from)
                .ok_or_else(|| QueryError::UnknownTestIdPrefix(test_id.to_string())),
        }
    }

    /// Expectation files a web test result was checked against, made local.
    ///
    /// Returns `None` for GPU suites, which only ever use one file.
    pub fn expectation_files(&self, reported: &[String]) -> Option<Vec<PathBuf>> {
        match self {
            SuiteKind::Gpu(_) => None,
            SuiteKind::WebTests => Some(
                reported
                    .iter()
                    // Absolute paths point at temporary files on the bot.
                    .filter(|f| !f.starts_with('/'))
                    .map(|f| {
                        f.split('/')
                            .fold(Path::new(WEB_TEST_ROOT_DIR).to_path_buf(), |acc, c| acc.join(c))
                    })
                    .collect(),
            ),
        }
    }

    pub fn reports_duration(&self) -> bool {
        matches!(self, SuiteKind::WebTests)
    }
}

/// Reads a BigQuery JSON cell that may be a number or a numeric string.
pub(crate) fn cell_as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
