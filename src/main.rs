use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use eventku_server::config::Config;
use eventku_server::lifecycle::LifecycleService;
use eventku_server::notifier::StoreNotifier;
use eventku_server::routes::{create_routes, AppState};
use eventku_server::store::{LifecycleStore, PgStore};
use eventku_server::sweeper::Sweeper;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    let store = PgStore::new(pool);
    store.migrate().await.expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let store: Arc<dyn LifecycleStore> = Arc::new(store);
    let notifier = Arc::new(StoreNotifier::new(store.clone()));
    let service = LifecycleService::new(store, notifier, config.payment_window);

    tokio::spawn(Sweeper::new(service.clone(), config.sweep_interval).run());

    let app: Router = create_routes(AppState { service });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
