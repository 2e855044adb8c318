//! Report dispatch

use std::io::{IsTerminal, Write};
use std::sync::Arc;

use eyre::WrapErr;
use hostinv_exec::{CommandExecutor, LocalExecutor};
use hostinv_inventory::{HardwareCollector, Probe, SystemCollector};
use hostinv_pkg::PackageCollector;
use hostinv_report::{
    OutputFormat, OutputSink, PackageList, Palette, Render, SystemReport, UpdateList,
};
use tracing::{info, instrument, warn};

use crate::cli::{self, Cli};
use crate::config::Config;

/// Run the reports selected by `cli`
///
/// # Errors
/// Returns error if the output file cannot be opened or the report cannot be
/// written
#[instrument(skip_all)]
pub async fn run(cli: &Cli, config: &Config) -> eyre::Result<()> {
    let selection = cli.selection();
    let stdout_palette = Palette::new(std::io::stdout().is_terminal());

    if selection.is_empty() {
        if !cli.quiet {
            println!("{}", cli::banner(&stdout_palette));
        }
        print!("{}", cli::usage());
        return Ok(());
    }

    let mut sink = match &cli.output {
        Some(path) => OutputSink::create(path)
            .wrap_err_with(|| format!("cannot open output file: {}", path.display()))?,
        None => OutputSink::stdout(),
    };

    if !cli.quiet && cli.output.is_none() {
        writeln!(sink, "{}", cli::banner(&stdout_palette))?;
    }

    let format = cli.output_format();

    // Quiet text mode collects nothing and prints nothing
    let render = !(cli.quiet && format == OutputFormat::Text);
    if format == OutputFormat::Xml {
        warn!("xml output is not supported, nothing will be rendered");
    }

    let executor: Arc<dyn CommandExecutor> = Arc::new(LocalExecutor::new());
    let timeout = config.command_timeout();
    let probe = Probe::new(&config.host.root, executor.clone()).with_timeout(timeout);

    if selection.system && render {
        let collector = SystemCollector::new(probe.clone());
        let snapshot = collector.snapshot().await;
        SystemReport::new(snapshot, cli.info_level()).print(format, &mut sink)?;
    }

    if selection.hardware && render {
        let collector = HardwareCollector::new(probe.clone());
        collector.snapshot().await.print(format, &mut sink)?;
    }

    if (selection.packages || selection.updates) && render {
        let collector = PackageCollector::detect(&config.host.root, executor, timeout).await;
        info!(system_type = %collector.system_type(), "package system");

        if selection.packages {
            let packages = collector.all_packages().await;
            PackageList::new(packages).print(format, &mut sink)?;
        }

        if selection.updates {
            let updates = collector.check_for_updates().await;
            UpdateList::new(&updates).print(format, &mut sink)?;
        }
    }

    if selection.logs {
        warn!("log collection is not supported");
    }

    sink.flush()?;

    if let Some(path) = &cli.output
        && !cli.quiet
    {
        println!(
            "{}",
            stdout_palette.success(&format!("hostinv: Output written to: {}", path.display()))
        );
    }

    Ok(())
}
