use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};

use feedmon::{
    Config, ConfiguredConnection, Connection, FeedMonitor, JsonTenantStore, RssFetcher,
    WebhookPublisher,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = match Config::load_with_env(&config_path).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = feedmon::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        feedmon::logging::init_console_only(&config.logging.level);
    }

    info!("feedmon {} starting", env!("CARGO_PKG_VERSION"));

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Feed monitor stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> feedmon::Result<()> {
    let connection = Arc::new(ConfiguredConnection::from_config(&config.tenants)?);
    let fetcher = Arc::new(RssFetcher::new(&config.fetch)?);
    let publisher = Arc::new(WebhookPublisher::new(&config.publisher)?);
    let store = Arc::new(JsonTenantStore::new(&config.store.path));

    if let Err(e) = connection.login().await {
        error!(error = %e, "Error initialising feed monitor");
        return Err(e);
    }

    let disconnect = connection.disconnect_handle();
    let mut monitor = FeedMonitor::new(&config.monitor, connection, store, fetcher, publisher)?;

    tokio::select! {
        result = monitor.run() => result,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for Ctrl-C");
            }
            disconnect.disconnect("interrupted");
            Err(feedmon::MonitorError::Connection("interrupted".to_string()))
        }
    }
}
