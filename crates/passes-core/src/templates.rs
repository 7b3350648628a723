//! Query text for the test-results tables.
//!
//! Templates carry explicit `{name}` placeholders filled by [`render`].
//! `@builder_name` and `@num_builds` are query parameters and are left in the
//! text untouched for the executor to bind.

use crate::builder_type::BuilderType;
use crate::suite::SuiteKind;

pub const TEST_FILTER_CLAUSE: &str = "test_filter_clause";

/// Builds whose gerrit change was submitted; used to scope try results.
pub const SUBMITTED_BUILDS_SUBQUERY: &str = r#"  submitted_builds AS (
    SELECT
      CONCAT("build-", CAST(unnested_builds.id AS STRING)) as id
    FROM
      `commit-queue.chromium.attempts`,
      UNNEST(builds) as unnested_builds,
      UNNEST(gerrit_changes) as unnested_changes
    WHERE
      unnested_builds.host = "cr-buildbucket.appspot.com"
      AND unnested_changes.submit_status = "SUCCESS"
      AND start_time > TIMESTAMP_SUB(CURRENT_TIMESTAMP(),
                                     INTERVAL 30 DAY)
  ),"#;

const RESULTS_SUBQUERY: &str = r#"  results AS (
    SELECT
      exported.id,
      test_id,
      status,
      (
        SELECT value
        FROM tr.tags
        WHERE key = "step_name") as step_name,
      ARRAY(
        SELECT value
        FROM tr.tags
        WHERE key = "typ_tag") as typ_tags,
      ARRAY(
        SELECT value
        FROM tr.tags
        WHERE key = "raw_typ_expectation") as typ_expectations{extra_columns}
    FROM
      `chrome-luci-data.chromium.{table_family}_{builder_type}_test_results` tr,
      builds b
    WHERE
      exported.id = build_inv_id
      AND status != "SKIP"
      {test_filter_clause}
  )"#;

const WEB_TEST_EXTRA_COLUMNS: &str = r#",
      duration,
      (
        SELECT value
        FROM tr.tags
        WHERE key = "web_tests_base_timeout") as timeout,
      ARRAY(
        SELECT value
        FROM tr.tags
        WHERE key = "web_tests_used_expectations_file") as expectation_files"#;

const CI_QUERY_TEMPLATE: &str = r#"WITH
  builds AS (
    SELECT
      DISTINCT exported.id build_inv_id,
      partition_time
    FROM
      `chrome-luci-data.chromium.{table_family}_ci_test_results` tr
    WHERE
      exported.realm = "chromium:ci"
      AND STRUCT("builder", @builder_name) IN UNNEST(variant)
    ORDER BY partition_time DESC
    LIMIT @num_builds
  ),
{results_subquery}
{final_selector_query}
"#;

const TRY_QUERY_TEMPLATE: &str = r#"WITH
{submitted_builds_subquery}
  builds AS (
    SELECT
      DISTINCT exported.id build_inv_id,
      partition_time
    FROM
      `chrome-luci-data.chromium.{table_family}_try_test_results` tr,
      submitted_builds sb
    WHERE
      exported.realm = "chromium:try"
      AND STRUCT("builder", @builder_name) IN UNNEST(variant)
      AND exported.id = sb.id
    ORDER BY partition_time DESC
    LIMIT @num_builds
  ),
{results_subquery}
{final_selector_query}
"#;

// Only the 50 most recent builds are used to decide which tests matter.
const TEST_FILTER_QUERY_TEMPLATE: &str = r#"WITH
  builds AS (
    SELECT
      DISTINCT exported.id build_inv_id,
      partition_time
    FROM
      `chrome-luci-data.chromium.{table_family}_{builder_type}_test_results` tr
    WHERE
      exported.realm = "chromium:{builder_type}"
      AND STRUCT("builder", @builder_name) IN UNNEST(variant)
    ORDER BY partition_time DESC
    LIMIT 50
  ),
  results AS (
    SELECT
      exported.id,
      test_id,
      ARRAY(
        SELECT value
        FROM tr.tags
        WHERE key = "typ_tag") as typ_tags,
      ARRAY(
        SELECT value
        FROM tr.tags
        WHERE key = "raw_typ_expectation") as typ_expectations
    FROM
      `chrome-luci-data.chromium.{table_family}_{builder_type}_test_results` tr,
      builds b
    WHERE
      exported.id = build_inv_id
      AND status != "SKIP"
      {test_filter_clause}
  )
SELECT DISTINCT r.test_id
FROM results r
WHERE
  (
    {expectation_predicate})
  {suite_filter_clause}
"#;

const ACTIVE_BUILDER_QUERY_TEMPLATE: &str = r#"WITH
  builders AS (
    SELECT
      (
        SELECT value
        FROM tr.variant
        WHERE key = "builder") as builder_name
    FROM
      `chrome-luci-data.chromium.{table_family}_{builder_type}_test_results` tr
  )
SELECT DISTINCT builder_name
FROM builders
"#;

/// Replaces each `{name}` in `template` with its value.
///
/// Placeholders not listed in `vars` are left as-is so a template can be
/// filled in stages.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}

fn expectation_predicate(suite: &SuiteKind, indent: &str) -> String {
    suite
        .qualifying_expectations()
        .iter()
        .map(|e| format!("\"{}\" IN UNNEST(typ_expectations)", e))
        .collect::<Vec<_>>()
        .join(&format!("\n{}OR ", indent))
}

fn final_selector_query(suite: &SuiteKind) -> String {
    format!(
        "SELECT *\nFROM results\nWHERE\n  {}",
        expectation_predicate(suite, "  ")
    )
}

/// The main results query for `suite` on `builder_type` builders.
///
/// `{test_filter_clause}` is still open in the returned text.
pub fn query_template(suite: &SuiteKind, builder_type: BuilderType) -> String {
    let extra_columns = if suite.reports_duration() {
        WEB_TEST_EXTRA_COLUMNS
    } else {
        ""
    };
    let results_subquery = render(
        RESULTS_SUBQUERY,
        &[
            ("extra_columns", extra_columns),
            ("table_family", suite.table_family()),
            ("builder_type", builder_type.as_str()),
        ],
    );
    let final_selector = final_selector_query(suite);

    let outer = match builder_type {
        BuilderType::Ci => CI_QUERY_TEMPLATE,
        BuilderType::Try => TRY_QUERY_TEMPLATE,
    };
    render(
        outer,
        &[
            ("submitted_builds_subquery", SUBMITTED_BUILDS_SUBQUERY),
            ("table_family", suite.table_family()),
            ("results_subquery", &results_subquery),
            ("final_selector_query", &final_selector),
        ],
    )
}

/// Query listing the distinct test IDs that currently have a qualifying
/// expectation on a builder.
pub fn test_filter_query(suite: &SuiteKind, builder_type: BuilderType) -> String {
    render(
        TEST_FILTER_QUERY_TEMPLATE,
        &[
            ("table_family", suite.table_family()),
            ("builder_type", builder_type.as_str()),
            (TEST_FILTER_CLAUSE, &suite.fixed_filter_clause()),
            ("expectation_predicate", &expectation_predicate(suite, "    ")),
            ("suite_filter_clause", &suite.suite_filter_clause()),
        ],
    )
}

pub fn active_builder_query(suite: &SuiteKind, builder_type: BuilderType) -> String {
    render(
        ACTIVE_BUILDER_QUERY_TEMPLATE,
        &[
            ("table_family", suite.table_family()),
            ("builder_type", builder_type.as_str()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let out = render("a {x} {y}", &[("x", "1")]);
        assert_eq!(out, "a 1 {y}");
    }

    #[test]
    fn test_ci_template_selection() {
        let q = query_template(&SuiteKind::gpu("pixel"), BuilderType::Ci);
        assert!(q.contains("`chrome-luci-data.chromium.gpu_ci_test_results`"));
        assert!(q.contains("exported.realm = \"chromium:ci\""));
        assert!(!q.contains("submitted_builds"));
        assert!(q.contains("{test_filter_clause}"));
        assert!(q.contains("\"RetryOnFailure\" IN UNNEST(typ_expectations)"));
        assert!(!q.contains("expectation_files"));
    }

    #[test]
    fn test_try_template_prepends_submitted_builds() {
        let q = query_template(&SuiteKind::WebTests, BuilderType::Try);
        assert!(q.starts_with("WITH\n  submitted_builds AS ("));
        assert!(q.contains("`chrome-luci-data.chromium.blink_web_tests_try_test_results`"));
        assert!(q.contains("AND exported.id = sb.id"));
        assert!(q.contains("\"Crash\" IN UNNEST(typ_expectations)"));
        assert!(q.contains("as expectation_files"));
        assert!(q.contains("as timeout"));
    }

    #[test]
    fn test_only_test_filter_placeholder_remains() {
        for suite in [SuiteKind::gpu("pixel"), SuiteKind::WebTests] {
            for bt in BuilderType::ALL {
                let filled = render(&query_template(&suite, bt), &[(TEST_FILTER_CLAUSE, "")]);
                assert!(!filled.contains('{'), "leftover placeholder in {}", filled);
            }
        }
    }

    #[test]
    fn test_filter_query_for_webgl() {
        let q = test_filter_query(&SuiteKind::gpu("webgl_conformance2"), BuilderType::Try);
        assert!(q.contains("LIMIT 50"));
        assert!(q.contains("exported.realm = \"chromium:try\""));
        assert!(q.contains(r#"r"gpu_tests\.webgl_conformance_integration_test\.""#));
        assert!(q.contains("AND \"webgl-version-2\" IN UNNEST(typ_tags)"));
        assert!(!q.contains('{'));
    }

    #[test]
    fn test_active_builder_query() {
        let q = active_builder_query(&SuiteKind::WebTests, BuilderType::Ci);
        assert!(q.contains("blink_web_tests_ci_test_results"));
        assert!(q.contains("SELECT DISTINCT builder_name"));
    }
}
