use anyhow::{Context, Result};
use biblio_core::{MemoryStore, QueryExecutor};
use biblio_server::mongo::{DEFAULT_COLLECTION, DEFAULT_DATABASE};
use biblio_server::{build_app, MongoExecutor};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "biblio-server", about = "Bibliographic search API")]
struct Args {
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// MongoDB connection string
    #[arg(long, env = "MONGO_URI")]
    mongo_uri: Option<String>,
    #[arg(long, env = "MONGO_DATABASE", default_value = DEFAULT_DATABASE)]
    database: String,
    #[arg(long, env = "MONGO_COLLECTION", default_value = DEFAULT_COLLECTION)]
    collection: String,
    /// Serve a JSON/JSONL file from memory instead of MongoDB
    #[arg(long)]
    fixtures: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let executor: Arc<dyn QueryExecutor> = match &args.fixtures {
        Some(path) => {
            let store = MemoryStore::load(path)?;
            tracing::info!(path = %path.display(), documents = store.len(), "serving fixtures");
            Arc::new(store)
        }
        None => {
            let uri = args.mongo_uri.as_deref().context("MONGO_URI is required unless --fixtures is given")?;
            Arc::new(MongoExecutor::connect(uri, &args.database, &args.collection).await?)
        }
    };
    let app = build_app(executor);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
