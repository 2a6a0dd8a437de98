//! HTTP server and API endpoints for the faucet server.

use crate::{
    config::FaucetConfig,
    error::{ApiError, ApiResult},
    eth::AlloyChainClient,
};
use alloy::primitives::Address;
use axum::{
    extract::{ConnectInfo, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{Duration, Utc};
use faucet_engine::{
    window_stats, ChainClient, Dispatcher, JsonlLedger, Ledger, NonceSequencer, RateLimiter,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

const DEFAULT_STATS_WINDOW_HOURS: i64 = 24;

/// Shared application state
#[derive(Clone)]
pub struct SharedState {
    pub dispatcher: Arc<Dispatcher>,
    pub ledger: Arc<dyn Ledger>,
    pub chain: Arc<dyn ChainClient>,
    pub source_account: Address,
}

/// Request to fund a wallet
#[derive(Debug, Serialize, Deserialize)]
pub struct FundRequest {
    pub wallet_address: String,
}

/// Response after a successful dispense
#[derive(Debug, Serialize)]
pub struct FundResponse {
    pub tx_hash: String,
}

/// Statistics query parameters
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub window_hours: Option<i64>,
}

/// Windowed statistics response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub successful_transactions: u64,
    pub failed_transactions: u64,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub ethereum_connected: bool,
    pub cached_nonce: Option<u64>,
}

/// Create the HTTP router with all endpoints
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/faucet/fund", post(fund_wallet))
        .route("/faucet/stats", get(faucet_stats))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Root endpoint - provides basic information
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "Testnet Faucet",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /faucet/fund": "Dispense the fixed payout to a wallet (provide wallet_address)",
            "GET /faucet/stats": "Success/failure counts over the last 24h (override with ?window_hours=)",
            "GET /health": "Health check",
        }
    }))
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> ApiResult<Json<HealthResponse>> {
    let ethereum_connected = state.chain.account_nonce(state.source_account).await.is_ok();
    let cached_nonce = state.dispatcher.nonces().peek().await;

    let response = HealthResponse {
        status: if ethereum_connected {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        ethereum_connected,
        cached_nonce,
    };

    info!("Health check completed: {:?}", response);
    Ok(Json(response))
}

/// Dispense the fixed payout to a wallet
async fn fund_wallet(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<FundRequest>,
) -> ApiResult<Json<FundResponse>> {
    info!("Fund request from {} for {}", addr.ip(), request.wallet_address);

    let wallet = AlloyChainClient::validate_address(&request.wallet_address)
        .map_err(ApiError::InvalidWalletAddress)?;

    let tx_hash = state.dispatcher.dispense(addr.ip(), wallet).await?;

    Ok(Json(FundResponse {
        tx_hash: format!("{:#x}", tx_hash),
    }))
}

/// Windowed success/failure statistics
async fn faucet_stats(
    State(state): State<SharedState>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<StatsResponse>> {
    let hours = query
        .window_hours
        .unwrap_or(DEFAULT_STATS_WINDOW_HOURS)
        .clamp(1, 24 * 365);
    let stats = window_stats(state.ledger.as_ref(), Duration::hours(hours), Utc::now());

    Ok(Json(StatsResponse {
        successful_transactions: stats.succeeded,
        failed_transactions: stats.failed,
    }))
}

/// Start the HTTP server
pub async fn start_server(config: &FaucetConfig) -> anyhow::Result<()> {
    info!("Starting faucet server...");

    // Initialize components
    let ledger: Arc<dyn Ledger> = Arc::new(JsonlLedger::open(&config.ledger.path)?);
    let chain = Arc::new(AlloyChainClient::new(&config.ethereum)?);
    let source_account = chain.source_account();

    let chain: Arc<dyn ChainClient> = chain;
    let nonces = Arc::new(NonceSequencer::new(source_account, chain.clone()));
    let limiter = RateLimiter::new(Duration::minutes(config.rate_limit.cooldown_minutes as i64));
    let dispatcher = Arc::new(Dispatcher::new(ledger.clone(), chain.clone(), nonces, limiter));

    let shared_state = SharedState {
        dispatcher,
        ledger,
        chain,
        source_account,
    };

    // Create router
    let app = create_router(shared_state);

    // Bind and serve
    let bind_addr = format!("{}:{}", config.http.bind_address, config.http.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", bind_addr, e))?;

    info!("Faucet server listening on {}", bind_addr);
    info!("Endpoints:");
    info!("  GET  /              - Server information");
    info!("  GET  /health        - Health check");
    info!("  POST /faucet/fund   - Dispense the fixed payout");
    info!("  GET  /faucet/stats  - Windowed statistics");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
