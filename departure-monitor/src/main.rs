use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use departure_monitor::config::{ConfigError, MonitorConfig, credential_from_env};
use departure_monitor::monitor::Monitor;
use departure_monitor::presentation::StopPresenter;
use departure_monitor::vasttrafik::{
    ApiError, ClientConfig, TokenManager, TokenPolicy, VasttrafikClient,
};
use departure_monitor::web::{AppState, create_router};

/// Number of hits listed by `search`.
const SEARCH_LIMIT: u32 = 10;

#[derive(Debug, thiserror::Error)]
enum SearchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("search") => {
            let query = args[1..].join(" ");
            if query.trim().is_empty() {
                eprintln!("usage: departure-monitor search <query>");
                return ExitCode::FAILURE;
            }
            match search(&query).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!("Stop search failed: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Some(other) => {
            eprintln!("unknown command: {other}");
            eprintln!("usage: departure-monitor [search <query>]");
            ExitCode::FAILURE
        }
        None => run().await,
    }
}

/// List stop areas matching `query`, one `gid  name` per line.
async fn search(query: &str) -> Result<(), SearchError> {
    let credential = credential_from_env()?;
    let client = VasttrafikClient::new(ClientConfig::default())?;
    let mut tokens = TokenManager::new(credential, TokenPolicy::default());
    let token = tokens.get_token(&client).await?;

    let stops = client.search_stop_areas(&token, query, SEARCH_LIMIT).await?;
    if stops.is_empty() {
        println!("No stop areas match {query:?}");
    }
    for stop in stops {
        println!("{}  {}", stop.gid, stop.name);
    }
    Ok(())
}

/// Run the monitor and the status server until Ctrl-C.
async fn run() -> ExitCode {
    let config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let monitor = match Monitor::start(&config).await {
        Ok(monitor) => monitor,
        Err(e) => {
            error!("Monitor setup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = AppState::new(
        monitor.coordinator().subscribe(),
        StopPresenter::from_config(&config),
    );
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", config.listen_addr, e);
            monitor.stop().await;
            return ExitCode::FAILURE;
        }
    };

    info!("Status server running on http://{}", config.listen_addr);
    info!("  GET /health      - Last update status");
    info!("  GET /departures  - Current departures");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("Shutting down");
    monitor.stop().await;

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
