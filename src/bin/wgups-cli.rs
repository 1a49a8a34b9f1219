use std::env;
use std::error::Error;
use std::io::{self, BufRead, Write};

use dotenv::dotenv;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wgups::config::constant::END_OF_DAY_HORIZON;
use wgups::report::{render_fleet, render_package, render_packages};
use wgups::{load_scenario, parse_clock, Dispatcher, PackageId, Settings};

const USAGE: &str = "usage: wgups-cli [<HH:MM[:SS]> [--package ID] [--json]]";

/// Initialize tracing and environment
fn init_tracing_and_env() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(io::stderr))
        .try_init()?;

    dotenv().ok();
    Ok(())
}

#[derive(Debug, Default)]
struct Query {
    time: Option<String>,
    package: Option<PackageId>,
    json: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Query, Box<dyn Error>> {
    let mut query = Query::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => query.json = true,
            "--package" | "-p" => {
                let raw = args.next().ok_or("--package needs an id")?;
                query.package = Some(raw.parse()?);
            }
            "--help" | "-h" => return Err(USAGE.into()),
            _ if query.time.is_none() => query.time = Some(arg),
            other => return Err(format!("unexpected argument {other:?}\n{USAGE}").into()),
        }
    }
    Ok(query)
}

fn run_once(dispatcher: &mut Dispatcher, query: &Query) -> Result<(), Box<dyn Error>> {
    let raw = query.time.as_deref().unwrap_or(END_OF_DAY_HORIZON);
    let at = parse_clock(raw)?;
    debug!("One-shot query at {}", raw);

    match query.package {
        Some(id) => {
            let report = dispatcher
                .package_at(id, at)
                .ok_or_else(|| format!("no package with id {id}"))?;
            if query.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_package(&report));
            }
        }
        None => {
            let snapshot = dispatcher.query_state(at);
            if query.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", render_packages(&snapshot));
                print!("{}", render_fleet(&snapshot));
            }
        }
    }
    Ok(())
}

fn prompt(input: &mut impl BufRead, message: &str) -> Result<Option<String>, Box<dyn Error>> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn interactive(dispatcher: &mut Dispatcher) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        println!();
        println!("1. All packages at a time");
        println!("2. One package at a time");
        println!("3. Total mileage at a time");
        println!("4. Exit");
        let Some(choice) = prompt(&mut input, "> ")? else {
            return Ok(());
        };
        if choice == "4" || choice.eq_ignore_ascii_case("exit") {
            return Ok(());
        }
        if !matches!(choice.as_str(), "1" | "2" | "3") {
            println!("Pick 1, 2, 3 or 4.");
            continue;
        }

        let Some(raw) = prompt(&mut input, "Time (HH:MM[:SS]): ")? else {
            return Ok(());
        };
        let at = match parse_clock(&raw) {
            Ok(at) => at,
            Err(err) => {
                warn!("{}", err);
                println!("{err}");
                continue;
            }
        };

        match choice.as_str() {
            "1" => print!("{}", render_packages(&dispatcher.query_state(at))),
            "2" => {
                let Some(raw_id) = prompt(&mut input, "Package id: ")? else {
                    return Ok(());
                };
                let report = raw_id
                    .parse::<PackageId>()
                    .ok()
                    .and_then(|id| dispatcher.package_at(id, at));
                match report {
                    Some(report) => print!("{}", render_package(&report)),
                    None => println!("No package with id {raw_id:?}"),
                }
            }
            _ => print!("{}", render_fleet(&dispatcher.query_state(at))),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing_and_env()?;

    let settings = Settings::from_env();
    let scenario = load_scenario(&settings)?;
    let mut dispatcher = Dispatcher::new(&scenario);

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        info!("No query given, starting interactive menu");
        return interactive(&mut dispatcher);
    }
    run_once(&mut dispatcher, &parse_args(args)?)
}
