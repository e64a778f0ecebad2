//! Todo persistence layer.
//!
//! The [`backend::TodoStore`] trait defines the five-operation interface;
//! [`memory::MemoryTodoStore`] keeps todos in process and
//! [`dynamodb::DynamoDbTodoStore`] talks to a DynamoDB table.

pub mod backend;
pub mod dynamodb;
pub mod memory;
