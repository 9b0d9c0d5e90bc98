use clap::Parser;
use poem::{Server, listener::TcpListener};

use corelog_backend::api;
use corelog_backend::app_data::AppData;
use corelog_backend::audit::AuditEmitter;
use corelog_backend::cli::{self, Cli, Commands};
use corelog_backend::config::{BootstrapSettings, DatabaseConnections, init_logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_logging()?;

    let cli = Cli::parse();

    let settings = BootstrapSettings::from_env()?;
    tracing::debug!("Loaded settings: {:?}", settings);

    let connections = DatabaseConnections::init(&settings).await?;

    match cli.command() {
        Commands::Migrate => {
            cli::migrate::run_migrations(&connections).await?;
        }
        Commands::SyncRollbackStatus => {
            connections.migrate().await?;
            let app_data = AppData::init(connections, &settings);
            cli::sync_rollback::sync_rollback_status(&app_data.audit_store).await?;
        }
        Commands::Serve => {
            connections.migrate().await?;
            let app_data = AppData::init(connections, &settings);
            serve(&app_data, &settings).await?;
        }
    }

    Ok(())
}

async fn serve(app_data: &AppData, settings: &BootstrapSettings) -> Result<(), std::io::Error> {
    let (emitter, audit_writer) = AuditEmitter::spawn(app_data.audit_store.clone(), settings.audit_buffer_size());

    let server_url = format!("http://localhost:{}", settings.server_port());
    let app = api::routes(app_data, emitter, &server_url);

    tracing::info!("Starting server on http://{}", settings.server_address());
    tracing::info!("Swagger UI available at {}/swagger", server_url);

    Server::new(TcpListener::bind(settings.server_address()))
        .run_with_graceful_shutdown(
            app,
            async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for shutdown signal: {}", e);
                    std::future::pending::<()>().await;
                }
                tracing::info!("Shutdown signal received");
            },
            None,
        )
        .await?;

    // The routes owned the last emitter handles, so the writer drains and stops
    if let Err(e) = audit_writer.await {
        tracing::error!("Audit writer task failed: {}", e);
    }

    Ok(())
}
