use email_directory::config::{Backend, Config};
use email_directory::db::{DirectoryStorage, connect, mysql_url};
use email_directory::router::{DirectoryState, directory_router};
use email_directory::service::EndpointResolver;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        backend = ?cfg.database.backend,
        listen_addr = %cfg.basic.listen_addr,
        loglevel = %cfg.basic.loglevel
    );

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
                return;
            }
            info!("shutdown requested");
            shutdown.cancel();
        });
    }

    let database_url = match cfg.database.backend {
        Backend::Sqlite => cfg.database.sqlite_url.clone(),
        Backend::Mysql => {
            let address = EndpointResolver::aws().resolve(&shutdown).await?;
            info!(
                host = %address,
                port = cfg.database.mysql.port,
                "connecting to managed database"
            );
            mysql_url(address.as_str(), &cfg.database.mysql)?
        }
    };

    let pool = connect(&database_url).await?;
    let storage = DirectoryStorage::new(pool);
    storage.initialize().await?;

    let state = DirectoryState::new(storage);
    let app = directory_router(state);

    let listener = TcpListener::bind(&cfg.basic.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}
