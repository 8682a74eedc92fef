use cardgate_backend::api::{self, AppState};
use cardgate_backend::bank::BankGatewayClient;
use cardgate_backend::cache::PaymentViewCache;
use cardgate_backend::config::AppConfig;
use cardgate_backend::database;
use cardgate_backend::database::merchant_repository::MerchantRepository;
use cardgate_backend::database::payment_repository::PaymentRepository;
use cardgate_backend::encryption::EncryptionCodec;
use cardgate_backend::logging::init_tracing;
use cardgate_backend::services::merchants::MerchantService;
use cardgate_backend::services::payments::PaymentService;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::info;

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    config.validate()?;

    init_tracing(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting cardgate backend service"
    );

    // Encryption codec is built before any store access; a bad key stops
    // startup here rather than failing a request later.
    let codec = Arc::new(EncryptionCodec::new(&config.encryption.key)?);

    let db_pool = database::init_pool_from_config(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Database connection pool initialized"
    );

    let bank = Arc::new(BankGatewayClient::new(&config.bank)?);
    info!(
        bank_url = %config.bank.primary_base_url()?,
        max_attempts = config.bank.max_attempts,
        breaker_threshold = config.bank.breaker_threshold,
        "Bank gateway client initialized"
    );

    let payment_repository = Arc::new(PaymentRepository::new(db_pool.clone(), codec));
    let merchant_repository = Arc::new(MerchantRepository::new(db_pool.clone()));

    let state = AppState {
        db_pool,
        payments: Arc::new(PaymentService::new(payment_repository, bank)),
        merchants: Arc::new(MerchantService::new(merchant_repository)),
        payment_cache: Arc::new(PaymentViewCache::new(config.cache.payment_ttl())),
        admin_api_key: config.security.admin_api_key.clone(),
    };

    let app = api::router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id()),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
