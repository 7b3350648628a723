use crate::builder_type::BuilderType;
use crate::suite::SuiteKind;
use crate::templates::{query_template, render, TEST_FILTER_CLAUSE};

/// Upper bound on rows a single query is expected to return.
pub const TARGET_RESULTS_PER_QUERY: usize = 20_000;

/// Produces the test filter clauses, and from them the queries, for one
/// builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryGenerator {
    /// One clause covering the whole suite.
    Fixed {
        builder_type: BuilderType,
        clause: String,
    },
    /// Explicit lists of quoted test IDs, one query per list.
    Split {
        builder_type: BuilderType,
        test_id_lists: Vec<Vec<String>>,
    },
}

impl QueryGenerator {
    pub fn fixed(builder_type: BuilderType, clause: impl Into<String>) -> Self {
        QueryGenerator::Fixed {
            builder_type,
            clause: clause.into(),
        }
    }

    /// Partitions `test_ids` so no list holds more than `target_num_ids`.
    ///
    /// IDs are dealt round-robin over `ceil(n / target)` lists, so list sizes
    /// differ by at most one.
    pub fn split(builder_type: BuilderType, test_ids: Vec<String>, target_num_ids: usize) -> Self {
        let target = target_num_ids.max(1);
        let num_lists = test_ids.len().div_ceil(target).max(1);
        let mut test_id_lists = vec![Vec::new(); num_lists];
        for (i, id) in test_ids.into_iter().enumerate() {
            test_id_lists[i % num_lists].push(id);
        }
        QueryGenerator::Split {
            builder_type,
            test_id_lists,
        }
    }

    pub fn builder_type(&self) -> BuilderType {
        match self {
            QueryGenerator::Fixed { builder_type, .. }
            | QueryGenerator::Split { builder_type, .. } => *builder_type,
        }
    }

    pub fn clauses(&self) -> Vec<String> {
        match self {
            QueryGenerator::Fixed { clause, .. } => vec![clause.clone()],
            QueryGenerator::Split { test_id_lists, .. } => test_id_lists
                .iter()
                .map(|ids| format!("AND test_id IN UNNEST([{}])", ids.join(", ")))
                .collect(),
        }
    }

    pub fn queries(&self, suite: &SuiteKind) -> Vec<String> {
        let template = query_template(suite, self.builder_type());
        self.clauses()
            .iter()
            .map(|clause| render(&template, &[(TEST_FILTER_CLAUSE, clause)]))
            .collect()
    }
}

/// How many test IDs fit in one query when each yields `num_samples` rows.
pub fn target_ids_per_query(num_samples: usize) -> usize {
    (TARGET_RESULTS_PER_QUERY / num_samples.max(1)).max(1)
}
