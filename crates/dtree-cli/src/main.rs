//! `dtree` command-line entry point

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use dtree_cli::{init_logging, parse_operations, render_summary, render_tree, run_demo, AppConfig};
use dtree_core::{build_operation_tree, TreeConfig};
use std::path::PathBuf;
use std::process::ExitCode;

fn cli() -> Command {
    Command::new("dtree")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build and value discussion operation trees")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .subcommand(
            Command::new("tree")
                .about("Build and value a tree from a JSON array of operations")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .short('i')
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON file with operation records"),
                )
                .arg(
                    Arg::new("initial")
                        .long("initial")
                        .default_value("0")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64))
                        .help("Discussion seed value"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Fail on duplicate ids and numeric errors"),
                ),
        )
        .subcommand(
            Command::new("demo")
                .about("Seed a sample discussion and print it")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(Command::new("config").about("Print the effective configuration"))
}

fn tree(args: &ArgMatches, config: &AppConfig) -> Result<()> {
    let input = args
        .get_one::<PathBuf>("input")
        .context("missing --input")?;
    let initial = args.get_one::<f64>("initial").copied().unwrap_or_default();
    let tree_config = if args.get_flag("strict") {
        TreeConfig::strict()
    } else {
        config.service.tree
    };

    let text = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let operations = parse_operations(&text)
        .with_context(|| format!("failed to parse operations in {}", input.display()))?;
    tracing::debug!(operations = operations.len(), "Loaded operations");

    let tree = build_operation_tree(&operations, initial, &tree_config)
        .context("failed to build operation tree")?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print!("{}", render_tree(&tree));
    }
    Ok(())
}

async fn demo(args: &ArgMatches, config: &AppConfig) -> Result<()> {
    let output = run_demo(config.service.clone())
        .await
        .context("failed to seed demo discussion")?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", render_summary(&output.summary));
        println!();
        print!("{}", render_tree(&output.tree.tree));
    }
    Ok(())
}

async fn run(matches: ArgMatches) -> Result<()> {
    let config = AppConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))
        .context("failed to load configuration")?;
    init_logging(&config.log).map_err(|e| anyhow::anyhow!(e))?;

    match matches.subcommand() {
        Some(("tree", args)) => tree(args, &config),
        Some(("demo", args)) => demo(args, &config).await,
        Some(("config", _)) => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        _ => unreachable!("subcommand is required"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(cli().get_matches()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
