//! Request handlers.
//!
//! Every handler does its storage work through `AppState::run`, which opens
//! one session, runs the closure on the blocking pool, and commits. Mutating
//! routes answer with a 303 back to the list page.

use askama::Template;
use axum::extract::{Form, Path, State};
use axum::response::{Html, Redirect};
use serde::Deserialize;
use todo_core::NewTodo;

use crate::error::AppError;
use crate::templates::IndexTemplate;
use crate::AppState;

const HOME: &str = "/";

/// Body of `POST /add`.
#[derive(Debug, Deserialize)]
pub struct AddTodoForm {
    pub title: String,
}

#[tracing::instrument(skip_all)]
pub async fn list_todos(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let todos = state.run(|session| session.list_todos()).await?;
    tracing::debug!(count = todos.len(), "rendering todo list");
    let page = IndexTemplate { todos: &todos }.render()?;
    Ok(Html(page))
}

#[tracing::instrument(skip_all)]
pub async fn add_todo(
    State(state): State<AppState>,
    Form(input): Form<AddTodoForm>,
) -> Result<Redirect, AppError> {
    let todo = state
        .run(move |session| session.add_todo(NewTodo::new(input.title)))
        .await?;
    tracing::info!(id = todo.id, title = %todo.title, "todo added");
    Ok(Redirect::to(HOME))
}

#[tracing::instrument(skip(state))]
pub async fn toggle_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    let todo = state.run(move |session| session.toggle_todo(id)).await?;
    tracing::info!(complete = todo.complete, "todo toggled");
    Ok(Redirect::to(HOME))
}

#[tracing::instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    state.run(move |session| session.delete_todo(id)).await?;
    tracing::info!("todo deleted");
    Ok(Redirect::to(HOME))
}

pub async fn health() -> &'static str {
    "ok"
}
