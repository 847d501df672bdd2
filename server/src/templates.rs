//! HTML views.

use askama::Template;
use todo_core::TodoItem;

/// The list page: every todo plus the form for adding another.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub todos: &'a [TodoItem],
}
