use crate::builder_type::BuilderType;
use crate::executor::{QueryExecutor, QueryParameters};
use crate::generator::{target_ids_per_query, QueryGenerator};
use crate::result::{classify_rows, TestResult};
use crate::suite::SuiteKind;
use crate::templates::{active_builder_query, test_filter_query};
use anyhow::Context;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Finds results for tests with failure-type expectations on a set of
/// builders.
pub struct Querier {
    suite: SuiteKind,
    project: String,
    num_samples: usize,
    large_query_mode: bool,
    executor: Arc<dyn QueryExecutor>,
}

impl Querier {
    pub fn new(
        suite: SuiteKind,
        project: impl Into<String>,
        num_samples: usize,
        large_query_mode: bool,
        executor: Arc<dyn QueryExecutor>,
    ) -> Self {
        Self {
            suite,
            project: project.into(),
            num_samples,
            large_query_mode,
            executor,
        }
    }

    pub fn suite(&self) -> &SuiteKind {
        &self.suite
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Picks the filter-clause policy for `builder`.
    ///
    /// In large query mode a discovery query runs first; `Ok(None)` means the
    /// builder has no tests with qualifying expectations and needs no further
    /// querying.
    pub async fn query_generator_for_builder(
        &self,
        builder: &str,
        builder_type: BuilderType,
    ) -> anyhow::Result<Option<QueryGenerator>> {
        if !self.large_query_mode {
            return Ok(Some(QueryGenerator::fixed(
                builder_type,
                self.suite.fixed_filter_clause(),
            )));
        }

        let query = test_filter_query(&self.suite, builder_type);
        let rows = self
            .executor
            .run_json(&query, &QueryParameters::for_builder(builder))
            .await
            .with_context(|| format!("test discovery query failed for {}", builder))?;

        let test_ids: Vec<String> = rows
            .iter()
            .filter_map(|r| r.get("test_id").and_then(|v| v.as_str()))
            .map(|id| format!("\"{}\"", id))
            .collect();

        if test_ids.is_empty() {
            return Ok(None);
        }

        Ok(Some(QueryGenerator::split(
            builder_type,
            test_ids,
            target_ids_per_query(self.num_samples),
        )))
    }

    /// Runs every query for one builder and returns the normalized results.
    pub async fn query_builder(
        &self,
        builder: &str,
        builder_type: BuilderType,
    ) -> anyhow::Result<Vec<TestResult>> {
        let Some(generator) = self
            .query_generator_for_builder(builder, builder_type)
            .await?
        else {
            tracing::info!(
                event = "builder_no_work",
                builder = %builder,
                builder_type = %builder_type,
                "no tests with qualifying expectations, skipping"
            );
            return Ok(Vec::new());
        };

        let params = QueryParameters::for_builder(builder).with_num_builds(self.num_samples);
        let mut results = Vec::new();
        for (i, query) in generator.queries(&self.suite).iter().enumerate() {
            let rows = self
                .executor
                .run_json(query, &params)
                .await
                .with_context(|| format!("results query {} failed for {}", i, builder))?;
            let row_count = rows.len();
            let mut classified = classify_rows(&self.suite, rows)?;
            tracing::debug!(
                event = "query_done",
                builder = %builder,
                query_index = i,
                rows = row_count,
                kept = classified.len()
            );
            results.append(&mut classified);
        }

        tracing::info!(
            event = "builder_done",
            builder = %builder,
            builder_type = %builder_type,
            results = results.len()
        );
        Ok(results)
    }

    /// Queries each builder in turn.
    pub async fn query_builders(
        &self,
        builders: &[String],
        builder_type: BuilderType,
    ) -> anyhow::Result<BTreeMap<String, Vec<TestResult>>> {
        let mut out = BTreeMap::new();
        for builder in builders {
            let results = self.query_builder(builder, builder_type).await?;
            out.insert(builder.clone(), results);
        }
        Ok(out)
    }

    /// Builders that have reported any results of this suite family.
    pub async fn get_active_builders(&self, builder_type: BuilderType) -> anyhow::Result<Vec<String>> {
        let query = active_builder_query(&self.suite, builder_type);
        let rows = self
            .executor
            .run_json(&query, &QueryParameters::default())
            .await
            .context("active builder query failed")?;

        let builders: BTreeSet<String> = rows
            .iter()
            .filter_map(|r| r.get("builder_name").and_then(|v| v.as_str()))
            .map(String::from)
            .collect();
        Ok(builders.into_iter().collect())
    }
}
