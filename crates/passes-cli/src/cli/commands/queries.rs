use super::{exit_codes, resolve_config, resolve_suite};
use crate::cli::args::QueriesArgs;
use passes_core::generator::QueryGenerator;
use passes_core::templates::{active_builder_query, test_filter_query};

pub fn run(args: QueriesArgs) -> anyhow::Result<i32> {
    let cfg = resolve_config(&args.suite)?;
    let suite = resolve_suite(&args.suite)?;

    if cfg.large_query_mode {
        println!("-- note: large query mode splits by discovered test ids at run time; showing the unsplit query");
    }
    let generator = QueryGenerator::fixed(args.builder_type, suite.fixed_filter_clause());
    for query in generator.queries(&suite) {
        println!("-- results query (@num_builds = {})", cfg.num_samples);
        println!("{}", query);
    }

    if args.all {
        println!("-- test discovery query");
        println!("{}", test_filter_query(&suite, args.builder_type));
        println!("-- active builder query");
        println!("{}", active_builder_query(&suite, args.builder_type));
    }
    Ok(exit_codes::OK)
}
