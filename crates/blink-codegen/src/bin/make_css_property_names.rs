use blink_codegen::css_property_names::{write_outputs, CssProperties};
use blink_codegen::{init_logging, report_error};
use clap::Parser;
use std::path::PathBuf;

/// Generate css_property_names.{h,cc} from css_properties.json5.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// css_properties.json5
    input: PathBuf,

    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() {
    let args = Args::parse();
    init_logging();

    let code = match CssProperties::load(&args.input) {
        Err(e) => report_error("reading CSS properties", &[&args.input.display(), &format!("{:#}", e)]),
        Ok(props) => match write_outputs(&props, &args.output_dir) {
            Ok(()) => 0,
            Err(e) => report_error("writing output files", &[&args.output_dir.display(), &format!("{:#}", e)]),
        },
    };
    std::process::exit(code);
}
