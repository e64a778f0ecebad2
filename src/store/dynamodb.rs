//! AWS DynamoDB todo store backend.
//!
//! One item per todo in a table partitioned on the string attribute `id`:
//! `id` (S), `title` (S), `completed` (BOOL).
//!
//! Update and delete carry an `attribute_exists(id)` condition so that a
//! missing key is reported as not-found instead of being silently upserted
//! or ignored.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use tracing::debug;

use super::backend::{generate_todo_id, CreateTodo, Todo, TodoStore, UpdateTodo};
use crate::config::DynamoDbStoreConfig;

const ATTR_ID: &str = "id";
const ATTR_TITLE: &str = "title";
const ATTR_COMPLETED: &str = "completed";

type Item = HashMap<String, AttributeValue>;

fn todo_to_item(todo: &Todo) -> Item {
    let mut item = HashMap::new();
    item.insert(ATTR_ID.to_string(), AttributeValue::S(todo.id.clone()));
    item.insert(ATTR_TITLE.to_string(), AttributeValue::S(todo.title.clone()));
    item.insert(
        ATTR_COMPLETED.to_string(),
        AttributeValue::Bool(todo.completed),
    );
    item
}

fn item_to_todo(item: &Item) -> anyhow::Result<Todo> {
    let id = item
        .get(ATTR_ID)
        .and_then(|v| v.as_s().ok())
        .ok_or_else(|| anyhow::anyhow!("todo item is missing string attribute 'id'"))?;
    let title = item
        .get(ATTR_TITLE)
        .and_then(|v| v.as_s().ok())
        .ok_or_else(|| anyhow::anyhow!("todo item {id} is missing string attribute 'title'"))?;
    let completed = item
        .get(ATTR_COMPLETED)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .unwrap_or(false);

    Ok(Todo {
        id: id.clone(),
        title: title.clone(),
        completed,
    })
}

/// Update expression parts for a partial update.
#[derive(Debug, PartialEq)]
struct UpdateParts {
    expression: String,
    names: HashMap<String, String>,
    values: Item,
}

/// Build a `SET` expression covering only the fields present in `update`.
///
/// Returns `None` for an empty update, which DynamoDB would reject.
fn build_update(update: &UpdateTodo) -> Option<UpdateParts> {
    let mut assignments = Vec::new();
    let mut names = HashMap::new();
    let mut values = HashMap::new();

    if let Some(title) = &update.title {
        assignments.push(format!("#{ATTR_TITLE} = :{ATTR_TITLE}"));
        names.insert(format!("#{ATTR_TITLE}"), ATTR_TITLE.to_string());
        values.insert(format!(":{ATTR_TITLE}"), AttributeValue::S(title.clone()));
    }
    if let Some(completed) = update.completed {
        assignments.push(format!("#{ATTR_COMPLETED} = :{ATTR_COMPLETED}"));
        names.insert(format!("#{ATTR_COMPLETED}"), ATTR_COMPLETED.to_string());
        values.insert(
            format!(":{ATTR_COMPLETED}"),
            AttributeValue::Bool(completed),
        );
    }

    if assignments.is_empty() {
        return None;
    }

    // Referenced by the attribute_exists condition.
    names.insert(format!("#{ATTR_ID}"), ATTR_ID.to_string());

    Some(UpdateParts {
        expression: format!("SET {}", assignments.join(", ")),
        names,
        values,
    })
}

pub struct DynamoDbTodoStore {
    client: Client,
    table_name: String,
}

impl DynamoDbTodoStore {
    pub async fn new(config: &DynamoDbStoreConfig) -> anyhow::Result<Self> {
        let mut builder = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &config.region {
            builder = builder.region(aws_config::Region::new(region.clone()));
        }

        if let Some(endpoint_url) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }

        let cfg = builder.load().await;
        Ok(Self::from_client(Client::new(&cfg), config.table_name.clone()))
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

impl TodoStore for DynamoDbTodoStore {
    fn list_all(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Todo>>> + Send + '_>> {
        Box::pin(async move {
            let mut todos = Vec::new();
            let mut exclusive_start_key: Option<Item> = None;

            loop {
                let result = self
                    .client
                    .scan()
                    .table_name(&self.table_name)
                    .set_exclusive_start_key(exclusive_start_key.take())
                    .send()
                    .await?;

                for item in result.items() {
                    todos.push(item_to_todo(item)?);
                }

                match result.last_evaluated_key() {
                    Some(key) if !key.is_empty() => exclusive_start_key = Some(key.clone()),
                    _ => break,
                }
            }

            debug!(table = %self.table_name, count = todos.len(), "scanned todos");
            Ok(todos)
        })
    }

    fn get_by_id(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<Todo>>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move {
            let result = self
                .client
                .get_item()
                .table_name(&self.table_name)
                .key(ATTR_ID, AttributeValue::S(id))
                .send()
                .await?;

            result.item().map(item_to_todo).transpose()
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

            self.client
                .put_item()
                .table_name(&self.table_name)
                .set_item(Some(todo_to_item(&record)))
                .send()
                .await?;

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
            let Some(parts) = build_update(&update) else {
                return self.get_by_id(&id).await;
            };

            let result = self
                .client
                .update_item()
                .table_name(&self.table_name)
                .key(ATTR_ID, AttributeValue::S(id.clone()))
                .update_expression(parts.expression)
                .condition_expression(format!("attribute_exists(#{ATTR_ID})"))
                .set_expression_attribute_names(Some(parts.names))
                .set_expression_attribute_values(Some(parts.values))
                .return_values(ReturnValue::AllNew)
                .send()
                .await;

            match result {
                Ok(output) => output.attributes().map(item_to_todo).transpose(),
                Err(err)
                    if err
                        .as_service_error()
                        .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
                {
                    debug!(%id, "update skipped: todo does not exist");
                    Ok(None)
                }
                Err(err) => Err(err.into()),
            }
        })
    }

    fn delete_by_id(
        &self,
        id: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<bool>> + Send + '_>> {
        let id = id.to_string();
        Box::pin(async move {
            let result = self
                .client
                .delete_item()
                .table_name(&self.table_name)
                .key(ATTR_ID, AttributeValue::S(id.clone()))
                .condition_expression(format!("attribute_exists(#{ATTR_ID})"))
                .expression_attribute_names(format!("#{ATTR_ID}"), ATTR_ID)
                .send()
                .await;

            match result {
                Ok(_) => Ok(true),
                Err(err)
                    if err
                        .as_service_error()
                        .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
                {
                    debug!(%id, "delete skipped: todo does not exist");
                    Ok(false)
                }
                Err(err) => Err(err.into()),
            }
        })
    }
}
