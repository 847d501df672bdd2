//! Domain types for the todo list.
//!
//! # Design
//! `TodoItem` is the only persisted entity. `NewTodo` is what a client may
//! supply on creation: just a title. `complete` always starts `false` and the
//! id is assigned by the store, so neither can be set from outside.

/// A single todo item as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: i64,
    pub title: String,
    pub complete: bool,
}

/// Payload for creating a new todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into().trim().to_string(),
        }
    }

    /// True when the title has no visible characters.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_todo_trims_title() {
        let input = NewTodo::new("  Buy milk \n");
        assert_eq!(input.title, "Buy milk");
        assert!(!input.is_blank());
    }

    #[test]
    fn whitespace_only_title_is_blank() {
        assert!(NewTodo::new("   ").is_blank());
        assert!(NewTodo::new("").is_blank());
    }
}
