use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

mod cli;
mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;
mod site;

use error::StartupError;

fn main() -> ExitCode {
    let args = cli::Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            logger::log_startup_failure(&err);
            ExitCode::FAILURE
        }
    }
}

/// Startup sequence: resolve root, validate artifacts, then serve until interrupted
fn run(args: &cli::Args) -> Result<(), StartupError> {
    let cfg = config::Config::load(args)?;
    logger::init(&cfg.logging).map_err(StartupError::Logger)?;

    let base_dir = match &cfg.site.base_dir {
        Some(dir) => dir.clone(),
        None => site::executable_dir()?,
    };
    let root = site::resolve_serve_root(&cfg.site, &base_dir)?;
    site::validate_artifacts(&root, &cfg.site.required_files)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(StartupError::Runtime)?;

    runtime.block_on(async_main(cfg, root))
}

async fn async_main(cfg: config::Config, root: site::ServeRoot) -> Result<(), StartupError> {
    let (std_listener, port) = server::PortBinder::from_config(&cfg.server)?.bind()?;
    let listener = TcpListener::from_std(std_listener).map_err(StartupError::Runtime)?;

    let shutdown = CancellationToken::new();
    server::start_signal_handler(shutdown.clone());

    logger::log_server_start(port, root.path());

    let state = Arc::new(config::AppState::new(&cfg, root));
    server::start_server_loop(
        listener,
        state,
        server::ServerLoopConfig::from(&cfg.performance),
        shutdown,
    )
    .await;

    logger::log_server_stopped();
    Ok(())
}
