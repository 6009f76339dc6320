//! routebot entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI flags and load config
//!   3. Resolve effective log level (CLI > env > config) and init logger once
//!   4. Build the LLM provider, router and chat service
//!   5. Spawn Ctrl-C → shutdown signal watcher
//!   6. Run the comms channels until shutdown

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use routebot::config::{self, Config, expand_home};
use routebot::error::AppError;
use routebot::llm::providers;
use routebot::logger;
use routebot::router;
use routebot::subsystems::chat::{ChatService, QueryOptions};
use routebot::subsystems::comms;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present; the file is optional.
    let _ = dotenvy::dotenv();

    let args = match parse_cli_args(std::env::args().skip(1))? {
        Command::Help => {
            print_help();
            return Ok(());
        }
        Command::Run(args) => args,
    };

    let mut config = config::load(args.config_path.as_deref())?;
    apply_cli_args(&mut config, &args)?;

    let effective_log_level = args.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let force_cli_level = args.log_level.is_some();
    logger::init(&effective_log_level, force_cli_level, config.log_file.as_deref())?;

    info!(
        app_name = %config.app_name,
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        provider = %config.llm.provider,
        pty = config.comms.pty.enabled,
        http = config.comms.http.enabled,
        "config loaded"
    );

    if config.llm.provider == "openai" && config.llm_api_key.is_none() {
        warn!("LLM_API_KEY (or OPENAI_API_KEY) is not set; backend calls will likely fail");
    }

    let provider = providers::build(&config.llm, config.llm_api_key.clone())
        .map_err(|e| AppError::Startup(e.to_string()))?;
    let router = router::build_default(&config, provider).map_err(|e| AppError::Startup(e.to_string()))?;
    info!(intents = ?router.registry().intents(), "router ready");

    let chat = Arc::new(ChatService::new(router, &config));

    // Shared shutdown token: Ctrl-C cancels it, all channels watch it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let console_options = QueryOptions { model: args.model.clone(), temperature: None };
    let channels = comms::start(&config, chat, console_options, shutdown.clone());
    let result = channels.join().await;

    shutdown.cancel();
    info!("shutdown complete");
    result
}

/// Fold CLI flags into the loaded config.
fn apply_cli_args(config: &mut Config, args: &CliArgs) -> Result<(), AppError> {
    if let Some(level) = &args.log_level {
        logger::parse_level(level)?;
    }
    if let Some(path) = &args.log_file {
        config.log_file = Some(expand_home(path));
    }
    if let Some(model) = &args.model {
        if !config.llm.models.contains(model) {
            return Err(AppError::Config(format!("--model '{model}' is not listed in [llm] models")));
        }
    }
    if args.serve {
        config.comms.http.enabled = true;
        // Serving is daemon-style unless the console is asked for too.
        if !args.interactive {
            config.comms.pty.enabled = false;
        }
    }
    if args.interactive {
        config.comms.pty.enabled = true;
    }
    Ok(())
}

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    config_path: Option<String>,
    interactive: bool,
    serve: bool,
    model: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
}

#[derive(Debug, PartialEq)]
enum Command {
    Run(CliArgs),
    Help,
}

fn print_help() {
    println!("Usage: routebot [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -h, --help                 Print help");
    println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
    println!("  -i, --interactive          Run the console channel");
    println!("      --serve                Run the HTTP API (see [comms.http] bind)");
    println!("      --model <NAME>         Model for console queries (must be listed in [llm] models)");
    println!("      --log-level <LEVEL>    error | warn | info | debug | trace");
    println!("      --log-file <PATH>      Append logs to this file instead of stderr");
    println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
}

fn take_value(flag: &str, iter: &mut impl Iterator<Item = String>) -> Result<String, AppError> {
    iter.next()
        .ok_or_else(|| AppError::Config(format!("{flag} requires a value")))
}

fn parse_cli_args(args: impl IntoIterator<Item = String>) -> Result<Command, AppError> {
    let mut cli = CliArgs::default();
    let mut verbosity = 0u8;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-i" | "--interactive" => cli.interactive = true,
            "--serve" => cli.serve = true,
            "-f" | "--config" => cli.config_path = Some(take_value("-f/--config", &mut iter)?),
            "--model" => cli.model = Some(take_value("--model", &mut iter)?),
            "--log-level" => cli.log_level = Some(take_value("--log-level", &mut iter)?),
            "--log-file" => cli.log_file = Some(take_value("--log-file", &mut iter)?),
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            other => return Err(AppError::Config(format!("unknown argument: {other}"))),
        }
    }

    // An explicit --log-level beats -v flags.
    //   -v → warn, -vv → info, -vvv → debug, -vvvv+ → trace
    if cli.log_level.is_none() {
        cli.log_level = match verbosity {
            0 => None,
            1 => Some("warn".into()),
            2 => Some("info".into()),
            3 => Some("debug".into()),
            _ => Some("trace".into()),
        };
    }

    Ok(Command::Run(cli))
}
