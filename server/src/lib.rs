//! HTTP front end for the todo list.
//!
//! # Overview
//! | Method | Path               | Effect                              |
//! |--------|--------------------|-------------------------------------|
//! | GET    | `/`                | HTML page listing every todo        |
//! | POST   | `/add`             | create from form field `title`, 303 |
//! | GET    | `/update/{todo_id}`| flip `complete`, 303                |
//! | GET    | `/delete/{todo_id}`| remove, 303                         |
//! | GET    | `/health`          | `ok`                                |
//!
//! # Design
//! The router holds only a `Database` handle. Each request gets its own
//! storage session, committed on success and rolled back on failure, so no
//! state lives in the process between requests.

pub mod config;
pub mod error;
pub mod routes;
pub mod templates;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use todo_core::{Database, Session, StoreError};

pub use config::Config;
pub use error::AppError;

/// Shared router state.
#[derive(Clone, Debug)]
pub struct AppState {
    db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Run `op` in a request-scoped session on the blocking pool.
    ///
    /// The session is committed if `op` succeeds and rolled back otherwise.
    pub async fn run<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Session) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        let value = tokio::task::spawn_blocking(move || db.with_session(op)).await??;
        Ok(value)
    }
}

pub fn app(db: Database) -> Router {
    Router::new()
        .route("/", get(routes::list_todos))
        .route("/add", post(routes::add_todo))
        .route("/update/{todo_id}", get(routes::toggle_todo))
        .route("/delete/{todo_id}", get(routes::delete_todo))
        .route("/health", get(routes::health))
        .with_state(AppState::new(db))
}

pub async fn run(listener: TcpListener, db: Database) -> Result<(), std::io::Error> {
    axum::serve(listener, app(db))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
