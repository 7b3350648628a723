use blink_codegen::{init_logging, report_error, sanitizer_builtins};
use clap::Parser;
use std::path::PathBuf;

/// Generate constants derived from the Sanitizer API spec.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    baseline_elements: PathBuf,
    #[arg(long)]
    baseline_attributes: PathBuf,
    #[arg(long)]
    default_configuration: PathBuf,
}

fn main() {
    let args = Args::parse();
    init_logging();
    let code = match sanitizer_builtins::run(
        &args.out,
        &args.baseline_elements,
        &args.baseline_attributes,
        &args.default_configuration,
    ) {
        Ok(()) => 0,
        Err(e) => report_error(e.context, &[&e.path.display(), &e.source]),
    };
    std::process::exit(code);
}
