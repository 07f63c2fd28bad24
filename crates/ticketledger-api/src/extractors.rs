//! Custom Axum extractors: the already-authenticated caller identity and
//! pagination parameters for `GET /v1/wallet/transactions`.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

// =============================================================================
// Authenticated user id
// =============================================================================

/// The upstream gateway authenticates the caller and forwards their id in
/// `X-User-ID`; this crate trusts that header rather than verifying a
/// session or JWT itself.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| error_response(ApiError::unauthorized()))?;

        Ok(AuthenticatedUser { user_id })
    }
}

// =============================================================================
// Pagination
// =============================================================================

#[derive(Debug, Clone, serde::Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        ((self.page.saturating_sub(1)) * self.limit) as i64
    }

    pub fn limit(&self, max: u32) -> i64 {
        self.limit.min(max) as i64
    }
}

pub struct Pagination(pub PaginationParams);

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| error_response(ApiError::bad_request(e.to_string())))?;

        if params.page == 0 {
            return Err(error_response(ApiError::bad_request("page must be >= 1")));
        }
        if params.limit == 0 || params.limit > 1000 {
            return Err(error_response(ApiError::bad_request("limit must be between 1 and 1000")));
        }

        Ok(Pagination(params))
    }
}

fn error_response(error: ApiError) -> Response {
    error.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offset() {
        let params = PaginationParams { page: 1, limit: 50 };
        assert_eq!(params.offset(), 0);

        let params = PaginationParams { page: 3, limit: 20 };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_pagination_limit_clamped() {
        let params = PaginationParams { page: 1, limit: 500 };
        assert_eq!(params.limit(100), 100);
    }
}
