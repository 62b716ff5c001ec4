//! Live chat support API
//!
//! (c) Softlandia 2025

use live_chat_api::api;
use live_chat_api::config::Settings;
use live_chat_api::core::services::LiveChatConversationService;
use live_chat_api::core::sweep;
use live_chat_api::core::traits::ConversationService;
use live_chat_api::infrastructure::database::DatabaseConnection;
use live_chat_api::infrastructure::identity::HttpIdentityProvider;
use live_chat_api::infrastructure::memory::InMemoryConversationRepository;
use live_chat_api::infrastructure::notifier::WebhookNotifier;
use live_chat_api::infrastructure::repositories::DbConversationRepository;

use anyhow::anyhow;
use axum::Router;
use axum::http::Method;
use axum::routing::get;
use di::{Injectable, Ref, ServiceCollection, ServiceProvider, singleton_as_self};
use di_axum::RouterServiceProviderExtensions;
use log::{info, warn};
use tokio::runtime::{Builder, Runtime};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let settings = Settings::from_env()?;
    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(web_server_task(settings))
}

async fn build_provider(settings: &Settings) -> anyhow::Result<ServiceProvider> {
    let shared = settings.clone();
    let mut services = ServiceCollection::new();
    services
        .add(singleton_as_self::<Settings>().from(move |_| Ref::new(shared.clone())))
        .add(HttpIdentityProvider::singleton())
        .add(WebhookNotifier::singleton())
        .add(LiveChatConversationService::singleton());

    if settings.database.is_some() {
        services
            .add(DatabaseConnection::singleton())
            .add(DbConversationRepository::singleton());
    } else {
        warn!("DATABASE_URL is not set, conversations are kept in memory only");
        services.add(InMemoryConversationRepository::singleton());
    }

    let provider = services
        .build_provider()
        .map_err(|e| anyhow!("invalid service configuration: {e:?}"))?;

    if settings.database.is_some() {
        provider
            .get_required::<DatabaseConnection>()
            .run_migrations()
            .await?;
        info!("database migrations applied");
    }

    Ok(provider)
}

async fn web_server_task(settings: Settings) -> anyhow::Result<()> {
    let provider = build_provider(&settings).await?;

    let conversation_service = provider.get_required::<dyn ConversationService>();
    let sweep_handle = tokio::spawn(sweep::auto_close_task(
        conversation_service,
        settings.auto_close_interval,
        settings.auto_close_after,
    ));

    let app = Router::new()
        .route("/health", get(health))
        .route_service(
            "/operator",
            ServeFile::new(settings.operator_dir.join("operator.html")),
        )
        .route_service(
            "/operator/login.html",
            ServeFile::new(settings.operator_dir.join("login.html")),
        )
        .merge(api::router())
        .fallback_service(ServiceBuilder::new().service(ServeDir::new(&settings.static_dir)))
        .layer(
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(Any),
        )
        .with_provider(provider);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", settings.port)).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweep_handle.abort();
    info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

async fn health() -> &'static str {
    "Live chat API running"
}
