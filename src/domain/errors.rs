use std::fmt;

use thiserror::Error;

/// Every failure an aggregate operation can surface. Not-found kinds are
/// always reported, never silently defaulted; `Database` wraps a store or
/// pool failure together with the operation that issued it; the creation,
/// update and deletion kinds name the step of a multi-step write that
/// failed after earlier steps had already committed.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order not found with id: {0}")]
    OrderNotFound(i32),

    #[error("order detail not found for order: {0}")]
    DetailNotFound(i32),

    #[error("database operation failed while {op}: {message}")]
    Database { op: String, message: String },

    #[error("failed to create order: {0}")]
    OrderCreation(String),

    #[error("failed to update order {0}: {1}")]
    OrderUpdate(i32, String),

    #[error("failed to delete order {0}: {1}")]
    OrderDeletion(i32, String),
}

impl OrderError {
    pub fn database(op: impl Into<String>, source: impl fmt::Display) -> Self {
        OrderError::Database {
            op: op.into(),
            message: source.to_string(),
        }
    }
}
