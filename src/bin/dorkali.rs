//! Command-line front end: pick a search engine by name, run the query and
//! print one result URL per line.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dorkali::{Engine, Error, Registry, SearchResult};

/// Dorks queries in search engines.
#[derive(Parser)]
#[command(name = "dorkali")]
#[command(version)]
#[command(disable_help_subcommand = true)]
#[command(override_usage = "dorkali [--json] <list | version [ENGINE] | help [ENGINE]>\n       \
                            dorkali [--json] ENGINE [OPTIONS] QUERY...")]
struct Cli {
    /// Print results as JSON lines instead of bare URLs
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the registered engines and exit
    List,

    /// Print the program version, or an engine's version, and exit
    Version { engine: Option<String> },

    /// Print this help, or an engine's help, and exit
    Help { engine: Option<String> },

    /// Search with ENGINE
    #[command(external_subcommand)]
    Engine(Vec<String>),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let registry = Registry::with_builtin();

    let Some(command) = cli.command else {
        init_tracing(false);
        print_main_help();
        return ExitCode::SUCCESS;
    };

    match command {
        Command::List => {
            init_tracing(false);
            println!("Registered engines:");
            for name in registry.names() {
                match registry.use_without_start(name) {
                    Ok(engine) => println!("\t{name}\t{engine}"),
                    Err(_) => println!("\t{name}"),
                }
            }
            ExitCode::SUCCESS
        }
        Command::Version { engine: None } => {
            println!("dorkali {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Command::Version { engine: Some(name) } => match engine_or_report(&registry, &name) {
            Some(engine) => {
                println!("{name} version: {}", engine.version());
                ExitCode::SUCCESS
            }
            None => ExitCode::FAILURE,
        },
        Command::Help { engine: None } => {
            print_main_help();
            ExitCode::SUCCESS
        }
        Command::Help { engine: Some(name) } => match engine_or_report(&registry, &name) {
            Some(engine) => {
                print!("{}", engine.usage());
                ExitCode::SUCCESS
            }
            None => ExitCode::FAILURE,
        },
        Command::Engine(args) => run(&registry, &args, cli.json),
    }
}

fn print_main_help() {
    // Nothing useful to do if stdout is closed
    let _ = Cli::command().print_help();
}

fn engine_or_report(registry: &Registry, name: &str) -> Option<Box<dyn Engine>> {
    match registry.use_without_start(name) {
        Ok(engine) => Some(engine),
        Err(_) => {
            eprintln!("Engine {name:?} not registered! use `dorkali list` to see engines.");
            None
        }
    }
}

fn run(registry: &Registry, args: &[String], json: bool) -> ExitCode {
    let Some((name, rest)) = args.split_first() else {
        print_main_help();
        return ExitCode::FAILURE;
    };

    let Some(mut engine) = engine_or_report(registry, name) else {
        return ExitCode::FAILURE;
    };

    if rest.iter().any(|a| a == "-h" || a == "--help") {
        print!("{}", engine.usage());
        return ExitCode::SUCCESS;
    }

    if let Err(err) = engine.configure(rest) {
        match err {
            Error::InvalidOption(msg) => eprint!("{msg}"),
            other => eprintln!("error: {other}"),
        }
        return ExitCode::FAILURE;
    }

    init_tracing(engine.verbose());

    let response = match engine.search() {
        Ok(response) => response,
        Err(err) => {
            eprintln!("error on search: {err}");
            return ExitCode::FAILURE;
        }
    };

    let results = match engine.parse_response(response) {
        Ok(results) => results,
        Err(err) => {
            eprintln!("error on parsing: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!(engine = %name, count = results.len(), "search finished");

    if let Err(err) = print_results(&results, json) {
        // A closed pipe (e.g. `| head`) is not a failure
        if err.kind() != io::ErrorKind::BrokenPipe {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

fn print_results(results: &[SearchResult], json: bool) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for result in results {
        if json {
            serde_json::to_writer(&mut out, result)?;
            writeln!(out)?;
        } else if !result.url.is_empty() {
            writeln!(out, "{}", result.url)?;
        }
    }
    out.flush()
}
