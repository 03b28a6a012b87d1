//! Record sources.
//!
//! A [`RemoteSource`] delivers untyped records exactly as the remote API
//! would. Turning them into entities is the store's job.

mod fixture;
mod memory;

pub use fixture::FixtureSource;
pub use memory::MemorySource;

use crate::error::SourceError;
use async_trait::async_trait;
use serde_json::Value;
use trajectory_core::{ProjectId, RawRecord};

/// Provider of raw project and story records
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// All projects of the account
    async fn list_projects(&self) -> Result<Vec<RawRecord>, SourceError>;

    /// All stories of one project
    async fn list_stories(&self, project_id: ProjectId) -> Result<Vec<RawRecord>, SourceError>;
}

/// Split a JSON array into object records
pub(crate) fn records_from_value(value: Value) -> Result<Vec<RawRecord>, SourceError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(SourceError::Json(format!(
                "expected an array of records, found {}",
                kind_of(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(map),
            other => Err(SourceError::Json(format!(
                "record {} is {}, expected an object",
                i,
                kind_of(&other)
            ))),
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
