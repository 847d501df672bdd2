use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use todo_core::Database;
use todo_server::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,todo_server=debug,todo_core=debug".into()),
        )
        .init();

    let config = Config::parse();

    let db = Database::open(&config.database)
        .with_context(|| format!("opening database {}", config.database.display()))?
        .with_busy_timeout(config.busy_timeout());

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, database = %config.database.display(), "listening");

    todo_server::run(listener, db).await?;
    Ok(())
}
