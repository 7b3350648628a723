use super::{build_querier, exit_codes};
use crate::cli::args::BuildersArgs;

pub async fn run(args: BuildersArgs) -> anyhow::Result<i32> {
    let (querier, _) = build_querier(&args.suite)?;
    let builders = querier.get_active_builders(args.builder_type).await?;
    for b in &builders {
        println!("{}", b);
    }
    eprintln!("{} active {} builder(s)", builders.len(), args.builder_type);
    Ok(exit_codes::OK)
}
