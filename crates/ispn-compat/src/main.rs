//! `ispn-compat` command line

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use ispn_compat::commands::{self, render_check};
use ispn_compat::{init_logger, read_tree, resolve_target, Compat, CompatConfig, LogFormat, CONFIG_FILE};
use ispn_subsystem::{InfinispanModel, LegacyRelease};

fn cli() -> Command {
    let input = || {
        Arg::new("input")
            .long("input")
            .short('i')
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Subsystem model document (JSON)")
    };
    let json = || {
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Output as JSON")
    };

    Command::new("ispn-compat")
        .version(ispn_compat::VERSION)
        .about("Infinispan subsystem compatibility and transport wiring tool")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .default_value(CONFIG_FILE)
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log filter, e.g. debug or ispn_transform=trace"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .value_parser(["compact", "json"])
                .help("Log line format"),
        )
        .arg(
            Arg::new("verify-determinism")
                .long("verify-determinism")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Run every rewrite twice and fail on differing results"),
        )
        .arg(
            Arg::new("fatal-rejections")
                .long("fatal-rejections")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Abort on the first rejection"),
        )
        .arg(
            Arg::new("default-group")
                .long("default-group")
                .global(true)
                .help("Channel of transports that name none"),
        )
        .subcommand(
            Command::new("versions")
                .about("List model versions and the legacy releases running them")
                .arg(json()),
        )
        .subcommand(
            Command::new("transform")
                .about("Transform a model to a legacy version")
                .arg(input())
                .arg(
                    Arg::new("target")
                        .long("target")
                        .short('t')
                        .required(true)
                        .help("Model version (1.6.0) or release (eap-640)"),
                )
                .arg(json()),
        )
        .subcommand(
            Command::new("check")
                .about("Check that a model boots on legacy releases, deterministically")
                .arg(input())
                .arg(
                    Arg::new("target")
                        .long("target")
                        .short('t')
                        .action(ArgAction::Append)
                        .help("Model version or release; every legacy model if omitted"),
                ),
        )
        .subcommand(
            Command::new("plan")
                .about("Plan and dry-run install the services of every transport")
                .arg(input())
                .arg(
                    Arg::new("uninstall")
                        .long("uninstall")
                        .action(ArgAction::SetTrue)
                        .help("Show removal order instead"),
                ),
        )
}

/// File configuration with command-line overrides applied
fn configure(matches: &ArgMatches) -> Result<CompatConfig> {
    let path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let mut config = CompatConfig::load(&path)?;

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level.clone_from(level);
    }
    match matches.get_one::<String>("log-format").map(String::as_str) {
        Some("json") => config.logging.format = LogFormat::Json,
        Some("compact") => config.logging.format = LogFormat::Compact,
        _ => {}
    }
    if matches.get_flag("verify-determinism") {
        config.transform.verify_determinism = true;
    }
    if matches.get_flag("fatal-rejections") {
        config.transform.fatal_rejections = true;
    }
    if let Some(group) = matches.get_one::<String>("default-group") {
        config.installer.default_group.clone_from(group);
    }
    Ok(config)
}

fn input(args: &ArgMatches) -> Result<PathBuf> {
    args.get_one::<PathBuf>("input")
        .cloned()
        .context("--input is required")
}

fn run() -> Result<i32> {
    let matches = cli().get_matches();
    let config = configure(&matches)?;
    init_logger(&config.logging)?;
    tracing::debug!("configuration: {config:?}");

    match matches.subcommand() {
        Some(("versions", args)) => {
            print!("{}", commands::versions(args.get_flag("json"))?);
            Ok(0)
        }
        Some(("transform", args)) => {
            let compat = Compat::new(&config)?;
            let tree = read_tree(&input(args)?)?;
            let target = args
                .get_one::<String>("target")
                .map(|t| resolve_target(t))
                .context("--target is required")??;
            let output = compat.transform(&tree, &target.version(), args.get_flag("json"))?;
            println!("{}", output.text);
            Ok(if output.clean { 0 } else { 1 })
        }
        Some(("check", args)) => {
            let compat = Compat::new(&config)?;
            let tree = read_tree(&input(args)?)?;
            let targets = match args.get_many::<String>("target") {
                Some(values) => values
                    .map(|t| resolve_target(t))
                    .collect::<Result<Vec<_>>>()?,
                None => {
                    let mut models: Vec<InfinispanModel> =
                        LegacyRelease::ALL.iter().map(|r| r.model()).collect();
                    models.dedup();
                    models
                }
            };
            let lines = compat.check(&tree, &targets)?;
            print!("{}", render_check(&lines)?);
            Ok(if lines.iter().all(commands::CheckLine::passed) { 0 } else { 1 })
        }
        Some(("plan", args)) => {
            let compat = Compat::new(&config)?;
            let tree = read_tree(&input(args)?)?;
            print!("{}", compat.plan(&tree, args.get_flag("uninstall"))?);
            Ok(0)
        }
        _ => Ok(2),
    }
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    }
}
