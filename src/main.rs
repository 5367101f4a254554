// src/main.rs

use std::sync::Arc;

use copydesk::config::Config;
use copydesk::models::policy::PolicyRules;
use copydesk::policy::ContentPolicy;
use copydesk::routes;
use copydesk::state::AppState;
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Load the content policy once; it is immutable afterwards
    let rules = match &config.policy_rules_path {
        Some(path) => {
            tracing::info!("Loading policy rules from {}", path.display());
            PolicyRules::from_file(path)
        }
        None => Ok(PolicyRules::default()),
    };

    let policy = match rules.and_then(ContentPolicy::new) {
        Ok(policy) => policy,
        Err(e) => {
            tracing::error!("Failed to load content policy: {}", e);
            std::process::exit(1);
        }
    };

    // Create AppState
    let state = AppState {
        policy: Arc::new(policy),
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listening address");

    // Start the server
    axum::serve(listener, app)
        .await
        .expect("Server error");
}
