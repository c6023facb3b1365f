// Entrypoint for the CLI application.
// Parses arguments, sets up logging, resolves the server URL and hands
// over to either the interactive menu or a single conversion.

use anyhow::Result;
use clap::{Parser, Subcommand};
use docpdf_cli::api::ApiClient;
use docpdf_cli::config::{self, Config, SERVER_URL_ENV};
use docpdf_cli::conversion::ConversionType;
use docpdf_cli::ui::{self, TerminalFrontend};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Send documents to a PDF conversion server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL of the conversion server
    #[arg(long, global = true)]
    server: Option<String>,

    /// Type the file path instead of using the native file dialog
    #[arg(long, global = true)]
    no_dialog: bool,

    /// Print result paths instead of opening them
    #[arg(long, global = true)]
    no_open: bool,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single file
    Convert {
        /// Conversion type: word, excel, ppt, jpg or any other tag
        #[arg(short = 't', long = "type")]
        ty: ConversionType,
        /// File to upload; a file picker is shown when omitted
        file: Option<PathBuf>,
    },
    /// Inspect or change the saved configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective server URL and the config file location
    Show,
    /// Save the server URL to the config file
    SetServer { url: String },
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let env_url = std::env::var(SERVER_URL_ENV).ok();
    let config_file = config::config_path().ok();
    let base_url = || {
        let url = config::resolve_server_url(
            config_file.as_deref(),
            cli.server.as_deref(),
            env_url.as_deref(),
        );
        debug!(%url, "resolved server url");
        url
    };

    let frontend = TerminalFrontend {
        use_dialog: !cli.no_dialog,
        open_results: !cli.no_open,
    };

    match cli.command {
        None => {
            let api = ApiClient::new(base_url())?;
            // Blocks until the user picks "Exit".
            ui::main_menu(&api, &frontend)?;
        }
        Some(Commands::Convert { ty, file }) => {
            let api = ApiClient::new(base_url())?;
            let report = match file {
                Some(file) => ui::convert_file(&api, &frontend, &ty, &file),
                None => ui::select_conversion(&api, &frontend, &ty),
            };
            return Ok(ExitCode::from(report.exit_code()));
        }
        Some(Commands::Config { command: ConfigCommands::Show }) => {
            println!("server: {}", base_url());
            println!("config: {}", config::config_path()?.display());
        }
        Some(Commands::Config { command: ConfigCommands::SetServer { url } }) => {
            // Overwrites whatever is there, including a file that no longer parses.
            let url = config::normalize_url(&url);
            let cfg = Config {
                server_url: Some(url.clone()),
            };
            let path = cfg.save()?;
            info!(path = %path.display(), "config saved");
            println!("Saved server {} to {}", url, path.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}
