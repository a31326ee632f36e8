use std::process::ExitCode;

use stoat_patterns::cli;

fn main() -> ExitCode {
    cli::parse_cli()
}
