use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rotafacil::cli::{open_store, run_seed};
use rotafacil::config::ServerConfig;
use rotafacil::server::{AppState, create_router};
use rotafacil::store::Store;

#[derive(Parser)]
#[command(name = "rotafacil")]
#[command(about = "School transportation management API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, env = "ROTAFACIL_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, env = "ROTAFACIL_PORT", default_value = "8080")]
        port: u16,

        #[command(flatten)]
        database: DatabaseArgs,
    },

    /// Reset the database to a small demo data set and run sample queries
    Seed {
        #[command(flatten)]
        database: DatabaseArgs,
    },
}

#[derive(Args)]
struct DatabaseArgs {
    /// Data directory for the database file
    #[arg(long, env = "ROTAFACIL_DATA_DIR", default_value = "./data")]
    data_dir: String,

    /// Keyspace name; the database file is <data-dir>/<keyspace>.db
    #[arg(long, env = "ROTAFACIL_KEYSPACE", default_value = "rotafacil")]
    keyspace: String,
}

impl DatabaseArgs {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            data_dir: self.data_dir.into(),
            keyspace: self.keyspace,
            ..Default::default()
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rotafacil=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Seed { database } => {
            run_seed(&database.into_config()).await?;
        }
        Commands::Serve {
            host,
            port,
            database,
        } => {
            let config = ServerConfig {
                host,
                port,
                ..database.into_config()
            };

            let store: Arc<dyn Store> = Arc::new(open_store(&config)?);
            info!("Using database at {}", config.db_path().display());

            let app = create_router(Arc::new(AppState::new(Arc::clone(&store))));
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            store.close()?;
        }
    }

    Ok(())
}
