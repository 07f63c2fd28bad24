//! DTOs for the operator-only transaction status override - the one
//! admin flow driven over HTTP.

use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdminTransitionRequest {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateTransactionStatusRequest {
    pub status: AdminTransitionRequest,
    /// Required when `status=failed`, ignored otherwise.
    pub reason: Option<String>,
}
