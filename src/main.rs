use std::sync::Arc;

use anyhow::Context;

use pawprint::app::{App, app_routes};
use pawprint::backend::{Backend, HttpBackend};
use pawprint::cli::Cli;
use pawprint::config::AppConfig;
use pawprint::store::{KeyValueStore, LibSqlStore, MemoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env();
    config.validate()?;

    eprintln!("🐾 Pawprint v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.api_url);
    eprintln!("   API: http://0.0.0.0:{}/api/view", config.port);

    // ── Store ────────────────────────────────────────────────────────────
    let store: Arc<dyn KeyValueStore> = match LibSqlStore::new_local(&config.db_path).await {
        Ok(store) => {
            eprintln!("   Store: {}", config.db_path.display());
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(
                path = %config.db_path.display(),
                error = %e,
                "Could not open store, sessions will not survive a restart"
            );
            eprintln!("   Store: in-memory");
            Arc::new(MemoryStore::new())
        }
    };

    // ── Backend + app ────────────────────────────────────────────────────
    let backend: Arc<dyn Backend> =
        Arc::new(HttpBackend::new(&config.api_url).with_upload_timeout(config.upload_timeout));
    let app = App::new(store, backend).await;

    if let Some(session) = app.session().await {
        eprintln!("   Logged in as {} ({})", session.display_name, session.role);
    }

    // ── HTTP surface ─────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "HTTP server started");
    let router = app_routes(app.clone());
    let server = tokio::spawn(async move { axum::serve(listener, router).await });

    if config.interactive {
        eprintln!("   Type 'help' for commands, 'quit' to exit.\n");
        Cli::new(app).run().await;
        server.abort();
    } else {
        server
            .await
            .context("HTTP server task failed")?
            .context("HTTP server stopped")?;
    }

    Ok(())
}
