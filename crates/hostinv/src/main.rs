//! hostinv
//!
//! Linux host inventory: system, hardware and package reports as text, JSON or CSV

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use hostinv_report::Palette;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod config;

use cli::Cli;
use config::Config;

/// Environment variable overriding the configured log filter
const LOG_ENV: &str = "HOSTINV_LOG";

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report_error(err: &eyre::Report) {
    let palette = Palette::new(std::io::stderr().is_terminal());
    eprintln!("{}", palette.error(&format!("hostinv error: {err:#}")));
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{e}");
            print!("{}", cli::usage());
            return ExitCode::FAILURE;
        }
    };

    if cli.help {
        print!("{}", cli::usage());
        return ExitCode::SUCCESS;
    }
    if cli.version {
        println!("hostinv {}", cli::VERSION);
        return ExitCode::SUCCESS;
    }

    if let Err(e) = color_eyre::install() {
        report_error(&e);
        return ExitCode::FAILURE;
    }

    let config = match Config::load_default() {
        Ok(config) => config,
        Err(e) => {
            report_error(&e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.log.level);
    debug!(source = ?config.source, root = %config.host.root.display(), "configuration loaded");

    match app::run(&cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}
