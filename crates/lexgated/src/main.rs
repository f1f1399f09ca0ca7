use clap::{Parser, Subcommand};
use lexgated::{is_process_alive, purge_store, read_pid_file, remove_pid_file, write_pid_file};
use lx_api::rest::health::init_start_time;
use lx_api::{build_router, AppState};
use lx_config::{ConfigPaths, ServiceConfig};
use std::net::SocketAddr;

#[derive(Parser)]
#[command(
    name = "lexgated",
    version = lexgated::DAEMON_VERSION,
    about = "Entitlement and usage service"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the service in the foreground
    Run {
        /// Port to bind to (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Check service status
    Status,
    /// Delete expired records from the store
    Purge,
    /// Print version
    Version,
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Shutting down...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "lexgated=info,lx_api=info,lx_quota=info,tower_http=info".into()
            }),
        )
        .init();

    let cli = Cli::parse();
    let paths = ConfigPaths::from_home()?;

    match cli.command {
        Commands::Run { port } => {
            paths.create_dir()?;
            let mut config = ServiceConfig::load_from(&paths)?;
            if let Some(port) = port {
                config.port = port;
            }

            let pid_path = paths.pid_path();
            if let Some(pid) = read_pid_file(&pid_path) {
                if pid != std::process::id() && is_process_alive(pid) {
                    anyhow::bail!("Service already running (PID {})", pid);
                }
                tracing::warn!("Removing stale PID file for dead process {}", pid);
                remove_pid_file(&pid_path);
            }
            write_pid_file(&pid_path)?;

            if config.webhook.secret.is_none() {
                tracing::warn!(
                    "No webhook secret configured; payment webhooks will not be verified"
                );
            }

            init_start_time();
            let state = AppState::new(config.clone())?;
            let app = build_router(state);

            let addr: SocketAddr = config.bind_addr().parse()?;
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!("Listening on {}", addr);

            let result = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await;
            remove_pid_file(&pid_path);
            result?;
            Ok(())
        }

        Commands::Status => {
            match read_pid_file(&paths.pid_path()) {
                Some(pid) if is_process_alive(pid) => {
                    println!("Service is running (PID {})", pid);
                    let config = ServiceConfig::load_from(&paths)?;
                    let url = format!("http://127.0.0.1:{}/api/health", config.port);
                    match reqwest::get(url).await {
                        Ok(resp) => {
                            let body: serde_json::Value = resp.json().await?;
                            println!("Version: {}", body["version"].as_str().unwrap_or("unknown"));
                            println!("Uptime: {}s", body["uptimeSecs"].as_u64().unwrap_or(0));
                        }
                        Err(_) => {
                            println!("(Could not reach health endpoint)");
                        }
                    }
                }
                Some(pid) => {
                    println!("Service is not running (stale PID {})", pid);
                    remove_pid_file(&paths.pid_path());
                }
                None => {
                    println!("Service is not running");
                }
            }
            Ok(())
        }

        Commands::Purge => {
            let config = ServiceConfig::load_from(&paths)?;
            let removed = purge_store(&config)?;
            println!("Removed {} expired entries", removed);
            Ok(())
        }

        Commands::Version => {
            println!("lexgated {}", lexgated::DAEMON_VERSION);
            Ok(())
        }
    }
}
