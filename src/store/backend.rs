//! Abstract todo store trait and record types.
//!
//! Any key-value backend must implement [`TodoStore`].  The trait uses
//! manually desugared async methods (pinned boxed futures) so it can be
//! held as `Arc<dyn TodoStore>` in [`crate::AppState`].

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use utoipa::ToSchema;

// ── Record types ───────────────────────────────────────────────────

/// A persisted todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Todo {
    /// System-generated identifier, immutable after creation.
    #[schema(example = "3f2b8c1e-6a0d-4e8f-9a57-1d2c3b4a5e6f")]
    pub id: String,
    /// Task title.
    #[schema(example = "Buy milk")]
    pub title: String,
    /// Completion flag.
    pub completed: bool,
}

/// Validated payload for creating a todo.
///
/// Built by [`crate::validation::validate_create`]; the derive only feeds
/// the OpenAPI schema.
#[derive(Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct CreateTodo {
    /// Task title (required).
    pub title: String,
    /// Completion flag; defaults to `false`.
    #[schema(default = false, required = false)]
    pub completed: bool,
}

/// Validated partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, ToSchema)]
pub struct UpdateTodo {
    /// New title, if present.
    pub title: Option<String>,
    /// New completion flag, if present.
    pub completed: Option<bool>,
}

impl UpdateTodo {
    /// True when the update carries no fields.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }

    /// Apply the present fields to `todo` in place.
    pub fn apply(&self, todo: &mut Todo) {
        if let Some(title) = &self.title {
            todo.title = title.clone();
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
    }
}

/// Generate a fresh todo identifier (random 128-bit UUID v4).
pub fn generate_todo_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ── Trait ───────────────────────────────────────────────────────────

/// Async todo store contract.
///
/// Each method is a single logical round-trip to the backend. Nothing is
/// retried; backend failures are returned as `anyhow::Error`.
pub trait TodoStore: Send + Sync + 'static {
    /// Return every todo. No ordering is guaranteed.
    fn list_all(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Todo>>> + Send + '_>>;

    /// Point lookup by id.
    fn get_by_id(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Todo>>> + Send + '_>>;

    /// Persist a new todo under a freshly generated id and return it.
    fn create(
        &self,
        todo: CreateTodo,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Todo>> + Send + '_>>;

    /// Apply a partial update to an existing todo.
    ///
    /// Returns the merged record, or `None` if no todo with `id` exists.
    /// Must never create a record.
    fn update_by_id(
        &self,
        id: &str,
        update: UpdateTodo,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Todo>>> + Send + '_>>;

    /// Delete a todo. Returns `false` if no todo with `id` existed.
    fn delete_by_id(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<bool>> + Send + '_>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Todo {
        Todo {
            id: "1".to_string(),
            title: "write docs".to_string(),
            completed: false,
        }
    }

    #[test]
    fn test_update_apply_partial() {
        let mut todo = sample();
        let update = UpdateTodo {
            title: None,
            completed: Some(true),
        };
        update.apply(&mut todo);
        assert_eq!(todo.title, "write docs");
        assert!(todo.completed);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(UpdateTodo::default().is_empty());
        assert!(!UpdateTodo {
            title: Some("x".to_string()),
            completed: None
        }
        .is_empty());
    }

    #[test]
    fn test_generate_todo_id_is_uuid() {
        let a = generate_todo_id();
        let b = generate_todo_id();
        assert_eq!(a.len(), 36);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
        assert_ne!(a, b);
    }

    #[test]
    fn test_todo_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "1", "title": "write docs", "completed": false})
        );
    }
}
