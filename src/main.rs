use clap::Parser;
use std::sync::Arc;
use subsidy_relay::utils::{logger, validation::Validate};
use subsidy_relay::{router, CliConfig, Gov24Client, RelayConfig, RelayState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(cli.verbose, cli.json_logs);

    tracing::info!("Starting subsidy-relay");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match RelayConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
    tracing::debug!("Resolved config: {:?}", config);

    let addr = config.socket_addr()?;
    let config = Arc::new(config);
    let api = Arc::new(Gov24Client::new(Arc::clone(&config)));
    let app = router(RelayState::new(config.clone(), api));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🚀 Listening on http://{}", listener.local_addr()?);
    tracing::info!("Allowed origins: {}", config.allowed_origins.join(", "));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, finishing in-flight requests");
}
