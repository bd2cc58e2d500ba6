//! # Command-Line Interface Module / 命令行接口模块
//!
//! Builds the localised `clap` command tree and dispatches to the subcommands.
//!
//! 构建本地化的 `clap` 命令树并分发到各子命令。

pub mod commands;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf, process::ExitCode};
use tracing::Level;

use crate::core::config::StrategyKind;
use crate::infra::{logging, t};
use commands::run::RunOptions;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` or `--lang=<VALUE>` argument.
///
/// 预解析命令行参数以查找语言设置，使 i18n 能在构建完整 CLI 之前初始化。
fn pre_parse_language() -> String {
    let args: Vec<String> = env::args().collect();
    if let Some(lang) = args.iter().find_map(|arg| arg.strip_prefix("--lang=")) {
        return lang.to_string();
    }
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        if let Some(lang) = args.get(pos + 1) {
            return lang.clone();
        }
    }
    // Fallback to system language detection
    sys_locale::get_locale().unwrap_or_else(|| "en".to_string())
}

pub fn build_cli(locale: &str) -> Command {
    Command::new("suite-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about", locale = locale).to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help(t!("cli.verbose", locale = locale).to_string())
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cli.run.about", locale = locale).to_string())
                .arg(
                    Arg::new("config")
                        .help(t!("cli.run.config", locale = locale).to_string())
                        .value_name("CONFIG")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help(t!("cli.run.jobs", locale = locale).to_string())
                        .value_name("JOBS")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("strategy")
                        .short('s')
                        .long("strategy")
                        .help(t!("cli.run.strategy", locale = locale).to_string())
                        .value_name("STRATEGY")
                        .value_parser(StrategyKind::NAMES)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("retries")
                        .short('r')
                        .long("retries")
                        .help(t!("cli.run.retries", locale = locale).to_string())
                        .value_name("RETRIES")
                        .value_parser(clap::value_parser!(u32))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("timeout")
                        .short('t')
                        .long("timeout")
                        .help(t!("cli.run.timeout", locale = locale).to_string())
                        .value_name("SECONDS")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(Command::new("plugins").about(t!("cli.plugins.about", locale = locale).to_string()))
        .subcommand(
            Command::new("init")
                .about(t!("cli.init.about", locale = locale).to_string())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help(t!("cli.init.output", locale = locale).to_string())
                        .value_name("PATH")
                        .default_value("suite.yaml")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("cli.init.force", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn run_options(matches: &ArgMatches) -> Result<RunOptions> {
    let strategy = matches
        .get_one::<String>("strategy")
        .map(|name| name.parse::<StrategyKind>())
        .transpose()?;
    let config = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("missing CONFIG argument"))?;

    Ok(RunOptions {
        config,
        jobs: matches.get_one::<usize>("jobs").copied(),
        strategy,
        retries: matches.get_one::<u32>("retries").copied(),
        timeout_secs: matches.get_one::<u64>("timeout").copied(),
    })
}

/// Parses the process arguments and runs the selected subcommand.
/// The returned exit code is failure when any test failed.
///
/// 解析进程参数并运行所选子命令。任何测试失败时返回失败退出码。
pub async fn run() -> Result<ExitCode> {
    // Pre-parse language and initialize i18n first.
    let language = pre_parse_language();
    crate::set_language(&language);

    let matches = build_cli(&language).get_matches();

    let level = if matches.get_flag("verbose") {
        Level::DEBUG
    } else {
        Level::WARN
    };
    logging::init_tracing(level);

    match matches.subcommand() {
        Some(("run", run_matches)) => commands::run::execute(run_options(run_matches)?).await,
        Some(("plugins", _)) => {
            commands::plugins::execute()?;
            Ok(ExitCode::SUCCESS)
        }
        Some(("init", init_matches)) => {
            let output = init_matches
                .get_one::<PathBuf>("output")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("suite.yaml"));
            commands::init::execute(&output, init_matches.get_flag("force"))?;
            Ok(ExitCode::SUCCESS)
        }
        // `subcommand_required` makes clap print help for anything else.
        _ => Ok(ExitCode::SUCCESS),
    }
}
