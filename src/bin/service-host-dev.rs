//! `service-host-dev`: run `service-host` under a supervisor that restarts it
//! on demand.
//!
//! Type `r`, `reload` or `hup` and press enter (or send SIGTSTP/SIGHUP) to
//! restart the server. Ctrl-C stops both.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use tokio::io::BufReader;

use service_host::lifecycle::signals::wait_for_shutdown_signal;
use service_host::observability::logging;
use service_host::supervisor::{control, spawn, CommandSpawner, Supervisor};

#[derive(Parser)]
#[command(name = "service-host-dev")]
#[command(about = "Run service-host with reload on demand", long_about = None)]
struct Cli {
    /// Server binary to supervise (default: `service-host` next to this binary).
    #[arg(long)]
    server_bin: Option<PathBuf>,

    /// Delay before a reloaded server is started again.
    #[arg(long, default_value_t = 200)]
    respawn_delay_ms: u64,

    /// Arguments passed to the server unchanged.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> ExitCode {
    logging::init("service_host=info");
    let cli = Cli::parse();

    if cli.args.is_empty() {
        eprintln!("{}", Cli::command().render_usage());
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("✗ failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(supervise(cli));
    // Stdin is read on a blocking thread that may never return.
    runtime.shutdown_background();
    code
}

async fn supervise(cli: Cli) -> ExitCode {
    let program = match cli.server_bin {
        Some(path) => path,
        None => match spawn::sibling_binary("service-host") {
            Ok(path) => path,
            Err(e) => {
                eprintln!("✗ cannot locate service-host: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };

    let supervisor = Supervisor::new(CommandSpawner::new(program).args(cli.args))
        .with_respawn_delay(Duration::from_millis(cli.respawn_delay_ms));
    let handle = supervisor.handle();

    tokio::spawn(control::forward_commands(
        BufReader::new(tokio::io::stdin()),
        handle.sender(),
    ));

    #[cfg(unix)]
    {
        match service_host::lifecycle::signals::ReloadSignals::install() {
            Ok(signals) => {
                tokio::spawn(control::forward_reload_signals(signals, handle.sender()));
            }
            Err(e) => tracing::warn!(error = %e, "Reload signals unavailable"),
        }
    }

    let shutdown = handle.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal().await {
            tracing::error!(error = %e, "Failed to install signal handlers");
            return;
        }
        shutdown.shutdown();
    });

    match supervisor.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}
