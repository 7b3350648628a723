use super::args::*;
use anyhow::Context;
use passes_core::config::{load_config, PassesConfig};
use passes_core::{BqExecutor, Querier, QueryError, SuiteKind};
use std::sync::Arc;

pub mod bench;
pub mod builders;
pub mod queries;
pub mod query;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Query(args) => query::run(args).await,
        Command::Queries(args) => queries::run(args),
        Command::Builders(args) => builders::run(args).await,
        Command::Bench(args) => bench::run(args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

/// Config file, then environment, then flags.
pub(crate) fn resolve_config(args: &SuiteArgs) -> anyhow::Result<PassesConfig> {
    let cfg = match &args.config {
        Some(path) => load_config(path, args.strict_config)?,
        None => PassesConfig::default(),
    };
    let mut cfg = cfg.apply_env();
    if let Some(p) = &args.project {
        cfg.project = p.clone();
    }
    if let Some(n) = args.num_samples {
        cfg.num_samples = n;
    }
    if args.large_query_mode {
        cfg.large_query_mode = true;
    }
    if let Some(b) = &args.bq_binary {
        cfg.bq_binary = b.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

pub(crate) fn resolve_suite(args: &SuiteArgs) -> anyhow::Result<SuiteKind> {
    match args.family {
        Family::Gpu => {
            let suite = args
                .suite
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| QueryError::Config("--suite is required for --family gpu".into()))?;
            Ok(SuiteKind::gpu(suite))
        }
        Family::WebTests => Ok(SuiteKind::WebTests),
    }
}

pub(crate) fn build_querier(args: &SuiteArgs) -> anyhow::Result<(Querier, PassesConfig)> {
    let cfg = resolve_config(args).context("invalid configuration")?;
    let suite = resolve_suite(args)?;
    tracing::debug!(event = "config_resolved", config = ?cfg, suite = ?suite);
    let executor = Arc::new(BqExecutor::new(cfg.bq_binary.clone(), cfg.project.clone()));
    let querier = Querier::new(
        suite,
        cfg.project.clone(),
        cfg.num_samples,
        cfg.large_query_mode,
        executor,
    );
    Ok((querier, cfg))
}
