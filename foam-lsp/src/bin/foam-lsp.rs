use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use foam_config::{ConfigError, FoamConfig, Loader};
use foam_lsp::{FoamLanguageServer, ServerSettings};
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Picked up from the working directory when present.
const LOCAL_CONFIG: &str = ".foam-lsp.toml";

#[derive(Parser)]
#[command(name = "foam-lsp")]
#[command(about = "Language server for OpenFOAM case dictionaries")]
#[command(version)]
struct Args {
    /// Configuration file layered over the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter directive, e.g. `foam_lsp=debug`
    #[arg(long)]
    log_filter: Option<String>,
}

fn load_config(args: &Args) -> Result<FoamConfig, ConfigError> {
    let mut loader = Loader::new().with_optional_file(LOCAL_CONFIG);
    if let Some(path) = &args.config {
        loader = loader.with_file(path);
    }
    loader.with_log_filter(args.log_filter.as_deref())?.build()
}

fn init_logging(args: &Args, config: &FoamConfig) {
    // `--log-filter` already sits in `config`; otherwise RUST_LOG beats the file layers.
    let filter = if args.log_filter.is_some() {
        EnvFilter::new(&config.logging.filter)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter))
    };
    // stdout carries the protocol.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("foam-lsp: failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&args, &config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting foam-lsp");
    let settings = ServerSettings::from(&config);
    let (service, socket) =
        LspService::new(move |client| FoamLanguageServer::with_settings(client, settings));
    Server::new(stdin(), stdout(), socket).serve(service).await;
    tracing::info!("foam-lsp exited");
    ExitCode::SUCCESS
}
