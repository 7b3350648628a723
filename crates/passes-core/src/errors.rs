use thiserror::Error;

/// Fatal conditions raised while building queries or normalizing rows.
///
/// None of these are retried. Configuration errors abort before any query is
/// issued; row-shape errors mean the results table no longer matches what the
/// querier was written against.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("unknown builder type '{0}' (expected 'ci' or 'try')")]
    UnknownBuilderType(String),

    #[error("unable to strip prefix from test ID {0}")]
    UnknownTestIdPrefix(String),

    #[error("unexpected build ID format: {0}")]
    BadBuildId(String),

    #[error("unexpected result status '{status}' for test ID {test_id}")]
    BadStatus { test_id: String, status: String },

    #[error("malformed result row: {0}")]
    MalformedRow(String),

    #[error("query executor failed: {0}")]
    Executor(String),

    #[error("config error: {0}")]
    Config(String),
}
