//! Small helpers shared by the use cases: DB-error wrapping and metadata
//! JSON plumbing for the signed-charge-token payloads.

use serde_json::{Map, Value};
use ticketledger_db::DbError;
use ticketledger_types::{EngineError, Metadata, Result};

/// `DbError` never reaches a use case's caller directly - a transaction
/// failing to commit, or an `update()` affecting zero rows, is always an
/// internal inconsistency from the use case's point of view (repositories
/// already return `Option`/early-return for the "not found" case).
pub(crate) fn wrap_db(e: DbError) -> EngineError {
    EngineError::internal(e.to_string())
}

pub(crate) fn value_to_plain_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn metadata_from_map(map: &Map<String, Value>, skip: &[&str]) -> Metadata {
    map.iter()
        .filter(|(k, _)| !skip.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), value_to_plain_string(v)))
        .collect()
}

pub(crate) fn require_str(
    map: &Map<String, Value>,
    reference: &str,
    field: &str,
) -> Result<String> {
    map.get(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| EngineError::MalformedProviderTransaction {
            reference: reference.to_string(),
            reason: format!("missing metadata.{field}"),
        })
}
