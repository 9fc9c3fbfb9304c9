use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::Path;

use clap::{Arg, ArgAction, Command};
use owo_colors::OwoColorize;
use tracing::{debug, warn};

use prereqs::dispatch::Registry;
use prereqs::error::{Problem, Severity};
use prereqs::output::{self, Identity, Render, Report, Selection, Terminal};
use prereqs::plugins;
use prereqs::scanning::{self, Outcome};

fn main() {
    const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

    let matches = Command::new("prereq-scanner")
        .version(VERSION)
        .propagate_version(true)
        .about("Scan Perl source for the modules it depends on.")
        .disable_help_subcommand(true)
        .arg(
            Arg::new("debug")
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log what the scanner is doing to standard error."),
        )
        .subcommand(
            Command::new("scan")
                .about("List the prerequisites of the given Perl source files")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Emit the prerequisites as JSON, keyed by filename."),
                )
                .arg(
                    Arg::new("recommends")
                        .long("recommends")
                        .action(ArgAction::SetTrue)
                        .help("Also list modules only loaded conditionally or at runtime."),
                )
                .arg(
                    Arg::new("suggests")
                        .long("suggests")
                        .action(ArgAction::SetTrue)
                        .help("Also list modules loaded inside eval, whose absence is tolerated."),
                )
                .arg(
                    Arg::new("raw-control-chars")
                        .short('R')
                        .long("raw-control-chars")
                        .action(ArgAction::SetTrue)
                        .help("Emit ANSI escape codes for colour even if output is redirected to a pipe or file."),
                )
                .arg(
                    Arg::new("filenames")
                        .required(true)
                        .num_args(1..)
                        .help("The files to scan. Use '-' to read from standard input."),
                ),
        )
        .subcommand(
            Command::new("tokens")
                .about("Show how the scanner tokenizes the given file")
                .arg(
                    Arg::new("raw-control-chars")
                        .short('R')
                        .long("raw-control-chars")
                        .action(ArgAction::SetTrue)
                        .help("Emit ANSI escape codes for colour even if output is redirected to a pipe or file."),
                )
                .arg(
                    Arg::new("filename")
                        .required(true)
                        .help("The file to tokenize. Use '-' to read from standard input."),
                ),
        )
        .get_matches();

    let level = if matches.get_flag("debug") {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let plugins = plugins::default_set();
    let registry = Registry::with_plugins(&plugins);

    let code = match matches.subcommand() {
        Some(("scan", submatches)) => {
            let filenames: Vec<&String> = submatches
                .get_many::<String>("filenames")
                .map(Iterator::collect)
                .unwrap_or_default();

            let selection = Selection {
                recommends: submatches.get_flag("recommends"),
                suggests: submatches.get_flag("suggests"),
            };

            let renderer = choose_renderer(submatches.get_flag("raw-control-chars"));

            run_scan(
                &registry,
                &filenames,
                selection,
                submatches.get_flag("json"),
                renderer,
            )
        }
        Some(("tokens", submatches)) => {
            // required argument, so clap has already insisted it be present
            let filename = submatches
                .get_one::<String>("filename")
                .map(String::as_str)
                .unwrap_or("-");

            let renderer = choose_renderer(submatches.get_flag("raw-control-chars"));

            run_tokens(&registry, Path::new(filename), renderer)
        }
        Some(_) => {
            println!("No valid subcommand was used");
            1
        }
        None => {
            println!("usage: prereq-scanner [COMMAND] ...");
            println!("Try '--help' for more information.");
            0
        }
    };

    std::process::exit(code);
}

fn choose_renderer(raw: bool) -> &'static dyn Render {
    if raw || std::io::stdout().is_terminal() {
        &Terminal
    } else {
        &Identity
    }
}

fn run_scan(
    registry: &Registry,
    filenames: &[&String],
    selection: Selection,
    json: bool,
    renderer: &dyn Render,
) -> i32 {
    let mut code = 0;
    let mut outcomes: Vec<(&String, Outcome)> = Vec::new();

    for filename in filenames {
        let path = Path::new(filename.as_str());
        debug!(filename = %path.display(), "scanning");

        let content = match scanning::load(path) {
            Ok(content) => content,
            Err(error) => {
                eprintln!("{}: {}", "error".bright_red(), error);
                code = 1;
                continue;
            }
        };

        let outcome = scanning::scan(registry, &content);

        for diagnostic in &outcome.diagnostics {
            let problem = Problem {
                severity: Severity::Warning,
                problem: diagnostic
                    .message
                    .clone(),
                filename: path,
                source: &outcome.source,
                offset: diagnostic.offset,
            };
            warn!("{}", problem);
        }

        if let Some(error) = &outcome.error {
            let problem = Problem {
                severity: Severity::Error,
                problem: error.message(),
                filename: path,
                source: &outcome.source,
                offset: error.offset(),
            };
            eprintln!("{}", problem.full_details());
            code = 1;
        }

        outcomes.push((filename, outcome));
    }

    if json {
        let reports: BTreeMap<String, Report<'_>> = outcomes
            .iter()
            .map(|(filename, outcome)| {
                (
                    filename.to_string(),
                    Report::new(&outcome.prerequisites, selection),
                )
            })
            .collect();

        match output::to_json(&reports) {
            Ok(json) => println!("{}", json),
            Err(error) => {
                eprintln!("{}: {}", "error".bright_red(), error);
                code = 1;
            }
        }
        return code;
    }

    for (filename, outcome) in &outcomes {
        if outcomes.len() > 1 {
            print!("{}", output::render_filename(renderer, filename));
        }
        let report = Report::new(&outcome.prerequisites, selection);
        print!("{}", output::render_report(renderer, &report));
    }

    code
}

fn run_tokens(registry: &Registry, filename: &Path, renderer: &dyn Render) -> i32 {
    let content = match scanning::load(filename) {
        Ok(content) => content,
        Err(error) => {
            eprintln!("{}: {}", "error".bright_red(), error);
            return 1;
        }
    };

    let (source, _) = scanning::decode(&content);

    match scanning::tokenize(registry, &source) {
        Ok(tokens) => {
            print!("{}", output::render_tokens(renderer, &tokens));
            0
        }
        Err(error) => {
            let problem = Problem {
                severity: Severity::Error,
                problem: error.message(),
                filename,
                source: &source,
                offset: error.offset(),
            };
            eprintln!("{}", problem.full_details());
            1
        }
    }
}
