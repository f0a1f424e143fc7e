//! `service-host`: boot one or more services into a single HTTP listener.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{CommandFactory, Parser};

use service_host::lifecycle::signals::wait_for_shutdown_signal;
use service_host::observability::logging;
use service_host::service::builtin;
use service_host::{BootstrapError, Orchestrator, ServiceLoader, ServiceRef};

/// Environment variable; `production` hides detailed error output.
const ENV_VAR: &str = "SERVICE_HOST_ENV";

#[derive(Parser)]
#[command(name = "service-host")]
#[command(about = "Run HTTP service modules on one shared listener", long_about = None)]
struct Cli {
    /// Service manifests, in initialization order. The first one configures
    /// the listener.
    services: Vec<PathBuf>,

    /// Seconds in-flight requests get to finish on shutdown.
    #[arg(long, default_value_t = 5)]
    drain_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init(logging::DEFAULT_FILTER);
    let cli = Cli::parse();

    let orchestrator = Orchestrator::new(ServiceLoader::new(builtin::registry()))
        .with_drain_timeout(Duration::from_secs(cli.drain_timeout_secs));
    let refs: Vec<ServiceRef> = cli.services.into_iter().map(ServiceRef::from).collect();

    let server = match orchestrator.run(refs).await {
        Ok(server) => server,
        Err(e) => return report_failure(&e),
    };

    if let Err(e) = wait_for_shutdown_signal().await {
        tracing::error!(error = %e, "Failed to install signal handlers");
    }

    match server.shutdown().await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server stopped with an error");
            ExitCode::FAILURE
        }
    }
}

fn report_failure(error: &BootstrapError) -> ExitCode {
    if let BootstrapError::Usage = error {
        eprintln!("{}", Cli::command().render_usage());
        return ExitCode::FAILURE;
    }

    eprintln!("✗ {}", error);
    let production = std::env::var(ENV_VAR).map(|v| v == "production").unwrap_or(false);
    if !production {
        eprintln!("{:#?}", error);
    }
    ExitCode::FAILURE
}
