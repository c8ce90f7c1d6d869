//! Cairn CLI
//!
//! Usage: cairn <COMMAND>
//!
//! Commands:
//!   deploy  Deploy a context onto a platform layout
//!   unlock  Remove a stale deployment lock
//!   scan    Scan a context for secrets and dangerous commands

mod commands;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use cairn::presentation::{exit, Cli, Commands};

use commands::Globals;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        cancel_clone.store(true, Ordering::SeqCst);
    }) {
        log::warn!("failed to install Ctrl+C handler: {e}");
    }

    let globals = Globals {
        json: cli.json,
        verbose: cli.verbose,
        config: cli.config.clone(),
    };

    let outcome = match &cli.command {
        Commands::Deploy(args) => commands::deploy::cmd_deploy(args, &globals, cancel),
        Commands::Unlock { platform, project } => {
            commands::unlock::cmd_unlock(*platform, project, &globals)
        }
        Commands::Scan { context } => commands::scan::cmd_scan(context, &globals),
    };

    match outcome {
        Ok(exit::SUCCESS) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            commands::print_error(&err, cli.json);
            std::process::exit(exit::INVALID);
        }
    }
}

/// `-v` info, `-vv` debug, `-vvv` trace; `RUST_LOG` wins when set
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
