use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use sysmon::app::{Monitor, View};
use sysmon::config::{Config, LogFormat, load_config, load_config_from_path};
use sysmon::event::Driver;
use sysmon::logging::init_tracing;
use sysmon::render;
use sysmon::system::collector::Collector;
use sysmon::system::control;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "sysmon",
    about = "Samples CPU, memory, disk, network and per-process statistics"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// View to sample: processes, charts, graphs
    #[arg(long, value_enum)]
    view: Option<View>,

    /// Refresh rate in milliseconds, applied to every view
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Stop after this many frames (runs until Ctrl-C when omitted)
    #[arg(long)]
    iterations: Option<usize>,

    /// Emit one JSON object per frame
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Maximum process rows per frame
    #[arg(long)]
    rows: Option<usize>,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Request graceful termination of a process
    Kill { pid: u32 },
    /// Show a one-shot detail record for a process
    Details { pid: u32 },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    init_tracing(&config.logging)?;

    match &cli.command {
        Some(Command::Kill { pid }) => Ok(run_kill(*pid)),
        Some(Command::Details { pid }) => run_details(*pid, cli.json).await,
        None => {
            run(config, &cli).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run(config: Config, cli: &Cli) -> Result<()> {
    if cli.refresh_rate == Some(0) {
        return Err(eyre!("--refresh-rate must be greater than 0"));
    }

    let Config {
        general, refresh, ..
    } = config;
    let view = general.default_view;
    let max_rows = general.max_rows;
    let monitor = tokio::task::spawn_blocking(move || {
        Monitor::new(Collector::new(), general.history_length, general.disk_path)
    })
    .await?;

    let mut driver = Driver::new(monitor, refresh);
    driver.switch(view);
    info!(view = view.label(), "sampling started");

    let mut remaining = cli.iterations;
    while remaining != Some(0) {
        tokio::select! {
            frame = driver.next() => {
                let Some(frame) = frame else { break };
                if cli.json {
                    println!("{}", render::frame_json(&frame)?);
                } else {
                    print!("{}", render::frame_text(&frame, max_rows));
                    println!();
                }
                remaining = remaining.map(|n| n.saturating_sub(1));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    driver.stop();
    Ok(())
}

fn run_kill(pid: u32) -> ExitCode {
    let mut collector = Collector::new();
    if control::terminate(collector.system_mut(), pid) {
        println!("Process with PID {pid} has been sent a termination request.");
        ExitCode::SUCCESS
    } else {
        eprintln!(
            "Unable to terminate PID {pid}: it no longer exists or access was denied."
        );
        ExitCode::FAILURE
    }
}

async fn run_details(pid: u32, json: bool) -> Result<ExitCode> {
    let detail = tokio::task::spawn_blocking(move || {
        let mut collector = Collector::new();
        control::detail(collector.system_mut(), pid)
    })
    .await?;

    match detail {
        Some(detail) if json => println!("{}", serde_json::to_string(&detail)?),
        Some(detail) => print!("{}", render::detail_text(&detail)),
        None => {
            eprintln!(
                "Unable to fetch details for PID {pid}: it may no longer exist or access may be denied."
            );
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(view) = cli.view {
        config.general.default_view = view;
    }
    if let Some(rows) = cli.rows {
        config.general.max_rows = rows;
    }
    if let Some(rate) = cli.refresh_rate {
        config.refresh.set_all(rate);
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.json && config.logging.file.is_none() {
        config.logging.format = LogFormat::Json;
    }

    config
}
