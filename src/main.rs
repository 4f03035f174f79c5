use canvas_collab::{
    build_router,
    routes::serve,
    directory::{InMemoryProjectRepository, InMemoryUserRepository, Project, User},
    operation::start_cleanup_task,
    AppState, Config, InMemoryPublisher,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "canvas_collab=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting collaboration server");

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Falling back to default configuration");
        Config::default()
    });

    // Single-process delivery; swap for a broker-backed Publisher when scaling out
    let publisher = Arc::new(InMemoryPublisher::new(config.topic_capacity));

    let projects = Arc::new(InMemoryProjectRepository::with_projects([Project::new(
        1,
        "Demo Canvas",
        "alice",
    )]));
    let users = Arc::new(InMemoryUserRepository::with_users([
        User::new("alice", "Alice"),
        User::new("bob", "Bob"),
    ]));

    let address = config.server_address();
    let app_state =
        AppState::new(config, publisher.clone(), projects, users).with_socket_hub(publisher);

    tokio::spawn(start_cleanup_task(
        app_state.operation_runner.clone(),
        app_state.config.cleanup_interval(),
    ));

    let app = build_router(app_state);

    if let Err(e) = serve(app, &address).await {
        error!(address = %address, error = %e, "Server failed");
        std::process::exit(1);
    }
}
