use clap::Parser;
use subscriber_dns_domain::{CliOverrides, Protocol};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "subscriber-dns")]
#[command(version)]
#[command(about = "Authoritative DNS for subscriber devices known to a device registry")]
struct Cli {
    /// Configuration file; repeat to layer files, later ones win
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Vec<String>,

    /// Bind address (host:port)
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Listener protocol (udp, tcp, tcp-tls)
    #[arg(short = 'p', long)]
    protocol: Option<Protocol>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        bind: cli.bind,
        protocol: cli.protocol,
        log_level: cli.log_level,
    };

    let config = bootstrap::load_config(&cli.config, cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting Subscriber DNS v{}", env!("CARGO_PKG_VERSION"));

    let dns_services = di::DnsServices::new(&config)?;

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_shutdown(shutdown.clone()));

    server::start_dns_server(&config, dns_services.mux, shutdown).await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn wait_for_shutdown(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(terminate) => terminate,
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("Received Ctrl-C"),
            _ = terminate.recv() => info!("Received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            return;
        }
    }

    shutdown.cancel();
}
