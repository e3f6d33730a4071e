//! Command line front end.
//!
//! Runs the requests of a workflow file and prints one summary line per
//! request. Logging goes to stderr through `env_logger`; set `RUST_LOG` or
//! pass `--verbose` for more detail.

use apex::config::load_config;
use apex::executor::{ReqwestClient, RunConfig, Workflow};
use apex::workflow::{self, validate_json_field, validate_url, WorkflowState};
use clap::{arg, command, value_parser, ArgAction, ArgMatches, Command};
use log::{info, warn};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

type CliResult<T> = Result<T, Box<dyn Error>>;

fn cli() -> Command {
    Command::new("apex")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .about(clap::crate_description!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            arg!(-v --verbose "Log each request and saved-value refresh")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            command!("run")
                .about("Run the requests of a workflow file")
                .arg(
                    arg!(<FILE> "Workflow file")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--from <INDEX> "Run from this request to the end")
                        .value_parser(value_parser!(usize))
                        .conflicts_with("only"),
                )
                .arg(
                    arg!(--only <INDEX> "Run this request only")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    arg!(-c --config <FILE> "Settings file with an \"apex\" section")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-o --out <FILE> "Write the updated workflow here")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            command!("keys")
                .about("List the extractable keys of a stored response")
                .arg(
                    arg!(<FILE> "Workflow file")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    arg!(<INDEX> "Request index")
                        .value_parser(value_parser!(usize)),
                ),
        )
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let matches = cli().get_matches();

    let level = if matches.get_flag("verbose") {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match matches.subcommand() {
        Some(("run", matches)) => run(matches).await,
        Some(("keys", matches)) => keys(matches),
        _ => Err("unknown subcommand".into()),
    }
}

async fn run(matches: &ArgMatches) -> CliResult<()> {
    if let Some(config_path) = matches.get_one::<PathBuf>("config") {
        let settings: serde_json::Value = serde_json::from_str(&fs::read_to_string(config_path)?)?;
        load_config(Some(settings))?;
    }

    let state = load(matches)?;
    info!("Loaded {} requests", state.len());
    for problem in check(&state) {
        warn!("{}", problem);
    }

    let client = ReqwestClient::from_global_config()?;
    let wf = Workflow::with_state(client, state, RunConfig::from_global_config());

    if let Some(index) = matches.get_one::<usize>("only") {
        wf.run_one(*index).await?;
    } else if let Some(index) = matches.get_one::<usize>("from") {
        wf.run_from_onward(*index).await;
    } else {
        wf.run_all().await;
    }

    let snapshot = wf.snapshot();
    for (index, request) in snapshot.requests().iter().enumerate() {
        match snapshot.response(index) {
            Some(record) => println!(
                "[{}] {} {} -> {} {}",
                index, request.method, request.url, record.status, record.status_text
            ),
            None => println!("[{}] {} {} -> no response", index, request.method, request.url),
        }
    }

    if let Some(out) = matches.get_one::<PathBuf>("out") {
        workflow::save_path(&snapshot, out)?;
        info!("Wrote {}", out.display());
    }

    Ok(())
}

fn keys(matches: &ArgMatches) -> CliResult<()> {
    let state = load(matches)?;
    let index = matches
        .get_one::<usize>("INDEX")
        .ok_or("missing request index")?;

    for key in state.response_keys(*index)? {
        println!("{}", key);
    }

    Ok(())
}

/// Validates every request the way an editor would before accepting it.
fn check(state: &WorkflowState) -> Vec<String> {
    let mut problems = Vec::new();

    for (index, request) in state.requests().iter().enumerate() {
        let scope = state.scope_for(index);
        if let Err(e) = validate_url(&request.url, &scope) {
            problems.push(format!("[{}] {}", index, e));
        }
        for (field, text) in [("arguments", &request.arguments), ("headers", &request.headers)] {
            if let Err(e) = validate_json_field(field, text) {
                problems.push(format!("[{}] {}", index, e));
            }
        }
    }

    problems
}

fn load(matches: &ArgMatches) -> CliResult<WorkflowState> {
    let path = matches
        .get_one::<PathBuf>("FILE")
        .ok_or("missing workflow file")?;

    Ok(workflow::load_path(path)?)
}
