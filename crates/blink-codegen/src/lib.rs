pub mod css_property_names;
pub mod sanitizer_builtins;

use tracing_subscriber::{fmt, EnvFilter};

/// Generators are quiet unless `BLINK_CODEGEN_LOG` asks otherwise.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env("BLINK_CODEGEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Formats a failure the way the build expects from its generators and
/// returns the exit code to use.
pub fn report_error(context: &str, infos: &[&dyn std::fmt::Display]) -> i32 {
    let mut lines = vec![format!("An error occurred when {}:", context)];
    lines.extend(infos.iter().map(|i| i.to_string()));
    eprintln!("{}", lines.join("\n\t"));
    1
}

/// Quotes `s` as a C string literal.
pub fn c_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
