//! In-memory todo store.
//!
//! Stores all todos in memory with no persistence. Useful for testing
//! and local runs. Uses `RwLock<HashMap>` for thread-safe access.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;

use super::backend::{generate_todo_id, CreateTodo, Todo, TodoStore, UpdateTodo};

#[derive(Debug, Default)]
pub struct MemoryTodoStore {
    todos: RwLock<HashMap<String, Todo>>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TodoStore for MemoryTodoStore {
    fn list_all(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Todo>>> + Send + '_>> {
        Box::pin(async move {
            let todos = self.todos.read().expect("rwlock poisoned");
            let mut all: Vec<_> = todos.values().cloned().collect();
            all.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(all)
        })
    }

    fn get_by_id(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Todo>>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move {
            let todos = self.todos.read().expect("rwlock poisoned");
            Ok(todos.get(&id).cloned())
        })
    }

    fn create(
        &self,
        todo: CreateTodo,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Todo>> + Send + '_>> {
        Box::pin(async move {
            let record = Todo {
                id: generate_todo_id(),
                title: todo.title,
                completed: todo.completed,
            };
            let mut todos = self.todos.write().expect("rwlock poisoned");
            todos.insert(record.id.clone(), record.clone());
            Ok(record)
        })
    }

    fn update_by_id(
        &self,
        id: &str,
        update: UpdateTodo,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Todo>>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut todos = self.todos.write().expect("rwlock poisoned");
            Ok(todos.get_mut(&id).map(|todo| {
                update.apply(todo);
                todo.clone()
            }))
        })
    }

    fn delete_by_id(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<bool>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut todos = self.todos.write().expect("rwlock poisoned");
            Ok(todos.remove(&id).is_some())
        })
    }
}
