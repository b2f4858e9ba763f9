use axum::{Router, http::header, routing::get};
use bundleflow::{
    api::{handlers::api_routes, openapi::ApiDoc},
    config::CONFIG,
    core::{
        amount::{BaseUnits, decimals_for_currency},
        services::BundleflowService,
        settlement::SettlementOrchestrator,
    },
    infrastructure::{
        logging::in_memory::InMemoryLogging, relay::mock::MockRelay, signer::local::LocalSigner,
        storage::in_memory::InMemoryStorage,
    },
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&CONFIG.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!("Starting with {:?}", *CONFIG);

    let settlement = CONFIG.settlement.clone();
    let decimals = decimals_for_currency(&settlement.currency);
    let relay = MockRelay::new()
        .with_default_balance(BaseUnits::from_decimal(&CONFIG.mock_balance, decimals)?)
        .with_relayer_fee(BaseUnits::from_decimal(&CONFIG.mock_relayer_fee, decimals)?);

    let signer = match &CONFIG.wallet_secret {
        Some(secret) => LocalSigner::from_secret_hex(secret)?,
        None => {
            warn!("WALLET_SECRET not set; using an ephemeral development key");
            LocalSigner::generate()
        }
    };
    info!("Development wallet address {}", signer.address());

    // Initialize storage, logging and the settlement pipeline
    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    let orchestrator = SettlementOrchestrator::new(relay, signer, settlement);
    let service = Arc::new(BundleflowService::new(storage, logging, orchestrator));

    let app = Router::new()
        .route("/", get(|| async { "OK" }))
        .nest("/api", api_routes(service))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([http::Method::GET, http::Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([127, 0, 0, 1], CONFIG.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
