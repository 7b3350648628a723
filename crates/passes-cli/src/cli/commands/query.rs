use super::{build_querier, exit_codes};
use crate::cli::args::{OutputFormat, QueryArgs};
use anyhow::Context;
use passes_core::{BuilderType, TestResult};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
struct QueryReport<'a> {
    schema_version: u32,
    generated_at: String,
    project: &'a str,
    suite: &'a str,
    builder_type: BuilderType,
    num_samples: usize,
    builders: &'a BTreeMap<String, Vec<TestResult>>,
}

pub async fn run(args: QueryArgs) -> anyhow::Result<i32> {
    let (querier, cfg) = build_querier(&args.suite)?;

    let builders = if !args.builders.is_empty() {
        args.builders.clone()
    } else {
        let configured = match args.builder_type {
            BuilderType::Ci => &cfg.builders.ci,
            BuilderType::Try => &cfg.builders.try_,
        };
        if configured.is_empty() {
            querier.get_active_builders(args.builder_type).await?
        } else {
            configured.clone()
        }
    };

    if builders.is_empty() {
        eprintln!("no {} builders to query", args.builder_type);
        return Ok(exit_codes::OK);
    }
    tracing::info!(event = "query_start", builders = builders.len(), builder_type = %args.builder_type);

    let results = querier.query_builders(&builders, args.builder_type).await?;

    let rendered = match args.format {
        OutputFormat::Json => {
            let report = QueryReport {
                schema_version: 1,
                generated_at: chrono::Utc::now().to_rfc3339(),
                project: querier.project(),
                suite: querier.suite().name(),
                builder_type: args.builder_type,
                num_samples: cfg.num_samples,
                builders: &results,
            };
            serde_json::to_string_pretty(&report)?
        }
        OutputFormat::Text => render_text(&results),
    };

    match &args.out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(exit_codes::OK)
}

fn render_text(results: &BTreeMap<String, Vec<TestResult>>) -> String {
    let mut out = String::new();
    for (builder, rows) in results {
        out.push_str(&format!("{} ({} results)\n", builder, rows.len()));
        for r in rows {
            out.push_str(&format!(
                "  {} [{:?}] build {} tags: {}\n",
                r.test_name,
                r.status,
                r.build_id,
                r.tags.join(" ")
            ));
        }
    }
    out
}
