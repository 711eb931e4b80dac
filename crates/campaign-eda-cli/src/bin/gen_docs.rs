//! Binary that emits command-line options markdown to stdout.

fn main() {
    print!("{}", campaign_eda_cli::render_options_markdown());
}
