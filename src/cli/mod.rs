use std::{process::ExitCode, sync::Once};

use clap::{arg, ArgAction, ArgMatches, Command};

mod run;

use run::{run_match, run_parse};

use crate::parser::PatternContext;

static TRACING_INIT: Once = Once::new();

/// Logs go to stderr only when `RUST_LOG` is set, e.g. `RUST_LOG=stoat_patterns=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

pub fn cli() -> Command {
    Command::new("stoat-patterns")
        .about("Parse and match pattern clauses")
        .version("0.1.0")
        .subcommand_required(true)
        .subcommand(
            Command::new("parse")
                .about("Parse a pattern and print it back")
                .arg(arg!(<PATTERN> "Pattern to parse"))
                .arg(arg!(--binding "Parse in a binding-only position (let, var, for-in)"))
                .arg(arg!(-d --debug "Print tokens and the pattern tree")),
        )
        .subcommand(
            Command::new("match")
                .about("Match a value against pattern cases, first match wins")
                .arg(
                    arg!(<VALUE> "Value literal, e.g. '(1, Shape.circle(2.5))'")
                        .allow_hyphen_values(true),
                )
                .arg(
                    arg!(-p --pattern <PATTERN> "Pattern case, may be repeated")
                        .required(true)
                        .allow_hyphen_values(true)
                        .action(ArgAction::Append),
                )
                .arg(
                    arg!(-s --subtype <SUBTYPE> "Nominal subtype as Sub:Super, may be repeated")
                        .required(false)
                        .action(ArgAction::Append),
                )
                .arg(arg!(--binding "Parse cases in a binding-only position"))
                .arg(arg!(-d --debug "Print the parsed value and cases")),
        )
}

fn context(args: &ArgMatches) -> PatternContext {
    if args.get_flag("binding") {
        PatternContext::BindingOnly
    } else {
        PatternContext::FullMatch
    }
}

pub fn parse_cli() -> ExitCode {
    init_tracing();
    let matches = cli().get_matches();

    let result = match matches.subcommand() {
        Some(("parse", args)) => {
            let Some(pattern) = args.get_one::<String>("PATTERN") else {
                return ExitCode::FAILURE;
            };
            run_parse(pattern, context(args), args.get_flag("debug")).map(|_| true)
        }
        Some(("match", args)) => {
            let Some(value) = args.get_one::<String>("VALUE") else {
                return ExitCode::FAILURE;
            };
            let patterns: Vec<&str> = args
                .get_many::<String>("pattern")
                .into_iter()
                .flatten()
                .map(String::as_str)
                .collect();
            let subtypes: Vec<&str> = args
                .get_many::<String>("subtype")
                .into_iter()
                .flatten()
                .map(String::as_str)
                .collect();

            run_match(
                value,
                &patterns,
                &subtypes,
                context(args),
                args.get_flag("debug"),
            )
        }
        _ => return ExitCode::FAILURE,
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(error) => {
            eprintln!("{error:?}");
            ExitCode::from(2)
        }
    }
}
