// Sonarbot API server entry point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post, Router};
use http::{header, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sonarbot_api::chain::BaseRpcClient;
use sonarbot_api::config::ApiConfig;
use sonarbot_api::db::DbPool;
use sonarbot_api::handlers::health::health_check;
use sonarbot_api::handlers::projects::{list_projects, submit_project, upvote_project};
use sonarbot_api::handlers::sponsored::{book_slot, confirm_booking, get_slots};
use sonarbot_api::handlers::status::get_status;
use sonarbot_api::handlers::subscriptions::{confirm_subscription, subscribe};
use sonarbot_api::handlers::AppContext;

fn load_env() {
    dotenv::dotenv().ok();
}

#[tokio::main]
async fn main() {
    load_env();
    // Configure logging with tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load API configuration from environment
    let config = ApiConfig::from_env();
    tracing::info!("Configuration loaded");

    // Parse server address from config before it moves into shared state
    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");

    if config.payment_address.is_none() {
        tracing::warn!("PAYMENT_ADDRESS is not set; booking and subscription flows will fail");
    }

    // Establish database connection pool
    let db_pool = DbPool::new(&config)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Connected to database");

    // Shared application context: config, repositories, chain RPC client
    let chain = BaseRpcClient::new(config.base_rpc_url.clone());
    let app_state = Arc::new(AppContext {
        repositories: db_pool.repositories(),
        chain,
        config,
    });

    // Configure CORS policy
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            header::AUTHORIZATION,
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            header::ACCESS_CONTROL_REQUEST_METHOD,
        ])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(3600));

    // Set up API routes
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/status", get(get_status))
        .route("/projects", get(list_projects).post(submit_project))
        .route("/projects/{id}/upvote", post(upvote_project))
        .route("/sponsored/slots", get(get_slots))
        .route("/sponsored/book", post(book_slot))
        .route("/sponsored/confirm", post(confirm_booking))
        .route("/subscribe", post(subscribe))
        .route("/subscribe/confirm", post(confirm_subscription))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Start HTTP server
    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
