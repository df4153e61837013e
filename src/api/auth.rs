use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared-secret guard for the n8n endpoints.
///
/// Passes every request when no `N8N_API_KEY` is configured.
#[derive(Debug, Clone, Copy)]
pub struct RelayAuth;

impl FromRequestParts<AppState> for RelayAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.relay.api_key.as_deref() else {
            return Ok(RelayAuth);
        };

        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        match provided {
            Some(key) if key == expected => Ok(RelayAuth),
            _ => Err(AppError::Unauthorized("Invalid or missing API key".to_string())),
        }
    }
}
