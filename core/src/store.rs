//! SQLite-backed storage for todo items.
//!
//! # Design
//! `Database` holds only the file location and session settings; it keeps no
//! connection open. `Database::session` opens a new connection and starts an
//! immediate transaction, handing back a `Session`. A session must be
//! committed explicitly; if it is dropped first, the transaction is rolled
//! back. Either way the connection closes with the session, so a unit of
//! work is released on every exit path, including early `?` returns.
//!
//! `BEGIN IMMEDIATE` takes the write lock up front. Concurrent sessions then
//! queue behind the busy timeout instead of failing on a lock upgrade halfway
//! through a read-modify-write like toggle.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, debug_span, warn, Span};
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{NewTodo, TodoItem};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    complete INTEGER NOT NULL DEFAULT 0 CHECK (complete IN (0, 1))
);
";

/// Handle to the todo database file.
///
/// Cheap to clone; every clone opens its own connections.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
    busy_timeout: Duration,
}

impl Database {
    /// Open (or create) the database at `path` and ensure the schema exists.
    ///
    /// Safe to call against an existing file: the schema step is idempotent
    /// and leaves stored rows untouched.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;
        debug!(path = %path.display(), "todo schema ensured");

        Ok(Self {
            path,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        })
    }

    /// How long a session waits on a locked database before giving up.
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection and begin a transaction on it.
    pub fn session(&self) -> Result<Session, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.execute_batch("BEGIN IMMEDIATE")?;

        let id = Uuid::new_v4();
        let span = debug_span!("session", id = %id);
        span.in_scope(|| debug!("session opened"));
        Ok(Session {
            conn,
            id,
            span,
            finished: false,
        })
    }

    /// Run `op` inside a fresh session.
    ///
    /// Commits when `op` returns `Ok`. On `Err` the session is dropped
    /// uncommitted, which rolls the transaction back.
    pub fn with_session<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Session) -> Result<T, StoreError>,
    {
        let mut session = self.session()?;
        let value = op(&mut session)?;
        session.commit()?;
        Ok(value)
    }
}

/// One unit of work against the database.
///
/// Holds its own connection with an open transaction. Nothing is visible to
/// other sessions until `commit` succeeds.
#[derive(Debug)]
pub struct Session {
    conn: Connection,
    id: Uuid,
    span: Span,
    finished: bool,
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// All todos in insertion order.
    pub fn list_todos(&self) -> Result<Vec<TodoItem>, StoreError> {
        let _enter = self.span.enter();
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, complete FROM todos ORDER BY id")?;
        let todos = stmt
            .query_map([], todo_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(todos)
    }

    pub fn get_todo(&self, id: i64) -> Result<TodoItem, StoreError> {
        let _enter = self.span.enter();
        self.conn
            .query_row(
                "SELECT id, title, complete FROM todos WHERE id = ?1",
                params![id],
                todo_from_row,
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))
    }

    /// Insert a new, incomplete todo and return it with its assigned id.
    pub fn add_todo(&mut self, input: NewTodo) -> Result<TodoItem, StoreError> {
        let _enter = self.span.enter();
        if input.is_blank() {
            return Err(StoreError::InvalidInput("title must not be empty"));
        }
        let title = input.title.trim().to_string();

        self.conn.execute(
            "INSERT INTO todos(title, complete) VALUES (?1, ?2)",
            params![title, false],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, "todo inserted");

        Ok(TodoItem {
            id,
            title,
            complete: false,
        })
    }

    /// Flip `complete` on an existing todo and return the updated row.
    pub fn toggle_todo(&mut self, id: i64) -> Result<TodoItem, StoreError> {
        let mut todo = self.get_todo(id)?;
        todo.complete = !todo.complete;

        let _enter = self.span.enter();
        self.conn.execute(
            "UPDATE todos SET complete = ?1 WHERE id = ?2",
            params![todo.complete, id],
        )?;
        debug!(id, complete = todo.complete, "todo toggled");

        Ok(todo)
    }

    pub fn delete_todo(&mut self, id: i64) -> Result<(), StoreError> {
        let _enter = self.span.enter();
        let removed = self
            .conn
            .execute("DELETE FROM todos WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(StoreError::NotFound(id));
        }
        debug!(id, "todo deleted");
        Ok(())
    }

    /// Commit the transaction and close the session.
    pub fn commit(mut self) -> Result<(), StoreError> {
        let span = self.span.clone();
        let _enter = span.enter();
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        debug!("session committed");
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let _enter = self.span.enter();
        match self.conn.execute_batch("ROLLBACK") {
            Ok(()) => debug!("session rolled back"),
            Err(err) => warn!(error = %err, "rollback failed"),
        }
    }
}

fn todo_from_row(row: &Row<'_>) -> rusqlite::Result<TodoItem> {
    Ok(TodoItem {
        id: row.get(0)?,
        title: row.get(1)?,
        complete: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn database() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("todo.db")).unwrap();
        (dir, db)
    }

    fn add(db: &Database, title: &str) -> TodoItem {
        db.with_session(|s| s.add_todo(NewTodo::new(title))).unwrap()
    }

    fn list(db: &Database) -> Vec<TodoItem> {
        db.with_session(|s| s.list_todos()).unwrap()
    }

    #[test]
    fn open_creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/todo.db");
        let db = Database::open(&path).unwrap();
        assert_eq!(db.path(), path.as_path());
        assert!(path.exists());
    }

    #[test]
    fn reopening_keeps_existing_rows() {
        let (dir, db) = database();
        add(&db, "Survives reopen");

        let reopened = Database::open(dir.path().join("todo.db")).unwrap();
        let todos = list(&reopened);
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Survives reopen");
    }

    #[test]
    fn add_starts_incomplete() {
        let (_dir, db) = database();
        let todo = add(&db, "Buy milk");
        assert_eq!(todo.title, "Buy milk");
        assert!(!todo.complete);

        assert_eq!(list(&db), vec![todo]);
    }

    #[test]
    fn add_rejects_blank_title() {
        let (_dir, db) = database();
        let err = db
            .with_session(|s| s.add_todo(NewTodo::new("   ")))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
        assert!(list(&db).is_empty());
    }

    #[test]
    fn list_is_in_insertion_order() {
        let (_dir, db) = database();
        for title in ["one", "two", "three"] {
            add(&db, title);
        }
        let titles: Vec<_> = list(&db).into_iter().map(|t| t.title).collect();
        assert_eq!(titles, ["one", "two", "three"]);
    }

    #[test]
    fn toggle_twice_restores_original_state() {
        let (_dir, db) = database();
        let todo = add(&db, "Flip me");

        let once = db.with_session(|s| s.toggle_todo(todo.id)).unwrap();
        assert!(once.complete);
        assert!(db.with_session(|s| s.get_todo(todo.id)).unwrap().complete);

        let twice = db.with_session(|s| s.toggle_todo(todo.id)).unwrap();
        assert!(!twice.complete);
        assert!(!db.with_session(|s| s.get_todo(todo.id)).unwrap().complete);
    }

    #[test]
    fn toggle_unknown_id_is_not_found() {
        let (_dir, db) = database();
        let err = db.with_session(|s| s.toggle_todo(42)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(42)));
    }

    #[test]
    fn delete_removes_row() {
        let (_dir, db) = database();
        let keep = add(&db, "keep");
        let gone = add(&db, "gone");

        db.with_session(|s| s.delete_todo(gone.id)).unwrap();

        assert_eq!(list(&db), vec![keep]);
        let err = db.with_session(|s| s.get_todo(gone.id)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == gone.id));
    }

    #[test]
    fn delete_unknown_id_is_not_found() {
        let (_dir, db) = database();
        let err = db.with_session(|s| s.delete_todo(7)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(7)));
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let (_dir, db) = database();
        add(&db, "first");
        let second = add(&db, "second");
        db.with_session(|s| s.delete_todo(second.id)).unwrap();

        let third = add(&db, "third");
        assert!(third.id > second.id);
    }

    #[test]
    fn dropped_session_rolls_back() {
        let (_dir, db) = database();
        {
            let mut session = db.session().unwrap();
            session.add_todo(NewTodo::new("never committed")).unwrap();
        }
        assert!(list(&db).is_empty());
    }

    #[test]
    fn failed_operation_rolls_back_earlier_writes() {
        let (_dir, db) = database();
        let err = db
            .with_session(|s| {
                s.add_todo(NewTodo::new("half done"))?;
                s.toggle_todo(999)
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(999)));
        assert!(list(&db).is_empty());
    }

    #[test]
    fn committed_session_is_visible_to_next_session() {
        let (_dir, db) = database();
        add(&db, "committed");

        let mut writer = db.session().unwrap();
        writer.add_todo(NewTodo::new("pending")).unwrap();
        writer.commit().unwrap();

        assert_eq!(list(&db).len(), 2);
    }

    #[test]
    fn sessions_get_distinct_ids() {
        let (_dir, db) = database();
        let a = db.session().unwrap();
        let a_id = a.id();
        drop(a);
        let b = db.session().unwrap();
        assert_ne!(a_id, b.id());
    }

    #[test]
    fn busy_timeout_bounds_wait_for_held_lock() {
        let (_dir, db) = database();
        let impatient = db.clone().with_busy_timeout(Duration::from_millis(50));

        let holder = db.session().unwrap();
        let err = impatient.session().unwrap_err();
        assert!(matches!(err, StoreError::Sql(_)));

        drop(holder);
        assert!(impatient.session().is_ok());
    }
}
