mod config_cmd;
mod devices_cmd;
mod runtime;
mod scan_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;

use lenstext_logging::ConsoleOutput;
use lenstext_tui::{App, SystemClipboard};

use runtime::Runtime;
use scan_cmd::OutputOptions;

#[derive(Parser)]
#[command(name = "lenstext")]
#[command(about = "LensText: pull the text out of a photo or image file")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.lenstext/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize the text in an image file
    Scan {
        file: PathBuf,
        /// Copy the text to the clipboard as well
        #[arg(long)]
        copy: bool,
        /// Print JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Take a photo with the camera and recognize its text
    Capture {
        /// Camera device to use instead of choosing one
        #[arg(short, long)]
        device: Option<String>,
        /// Capture as soon as the camera is ready
        #[arg(long)]
        now: bool,
        #[arg(long)]
        copy: bool,
        #[arg(long)]
        json: bool,
    },
    /// Interactive terminal UI
    Ui {
        #[arg(short, long)]
        device: Option<String>,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List camera devices
    Devices {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config with secrets masked
    Show,
    /// Print the config file path
    Path,
    /// Write a config file with all defaults
    Init {
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let runtime = Runtime::load(cli.config.as_deref()).await?;

    let console = match cli.command {
        Commands::Ui { .. } => ConsoleOutput::Off,
        _ => ConsoleOutput::Stderr,
    };
    let _guard = runtime.init_logging(console)?;
    runtime.log_report();
    info!(config = %runtime.config_path.display(), "LensText starting");

    let ok = match cli.command {
        Commands::Scan { file, copy, json } => {
            let controller = runtime.controller(None);
            scan_cmd::scan(controller, &file, OutputOptions { json, copy }).await?
        }
        Commands::Capture {
            device,
            now,
            copy,
            json,
        } => {
            let controller = runtime.controller(device);
            scan_cmd::capture(controller, now, OutputOptions { json, copy }).await?
        }
        Commands::Ui { device } => {
            let (tx, rx) = mpsc::unbounded_channel();
            let app = App::new(runtime.controller(device), Box::new(SystemClipboard::new()), tx)
                .with_indicator(runtime.copied_indicator());
            lenstext_tui::run(app, rx).await?;
            true
        }
        Commands::Config { action } => {
            match action {
                ConfigAction::Show => config_cmd::show(&runtime.config)?,
                ConfigAction::Path => config_cmd::path(&runtime.config_path),
                ConfigAction::Init { force } => config_cmd::init(&runtime.config_path, force).await?,
            }
            true
        }
        Commands::Devices { json } => {
            devices_cmd::run(&runtime.camera(), &runtime.camera_request(None), json).await?;
            true
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
