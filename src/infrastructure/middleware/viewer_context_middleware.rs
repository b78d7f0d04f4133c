// ViewerContext Middleware - derives the acting viewer from request headers
// and injects it into request extensions for handlers

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::infrastructure::viewer::ViewerContext;

/// Trait for application state that knows how administrators authenticate
pub trait HasAdminToken {
    fn admin_token(&self) -> Option<&str>;
}

/// Credentials presented by a request
#[derive(Debug, Clone, PartialEq)]
pub enum AuthInfo {
    Anonymous,
    Bearer(String),
}

pub async fn viewer_context_middleware<T>(
    State(app_state): State<T>,
    mut request: Request,
    next: Next,
) -> Response
where
    T: HasAdminToken + Clone + Send + Sync + 'static,
{
    let auth_info = match extract_auth_from_request(request.headers()) {
        Ok(info) => info,
        Err(err) => return err.into_response(),
    };

    let viewer_context = match create_viewer_context(auth_info, app_state.admin_token()) {
        Ok(vc) => vc,
        Err(err) => return err.into_response(),
    };

    request.extensions_mut().insert(Arc::new(viewer_context));
    next.run(request).await
}

fn extract_auth_from_request(headers: &HeaderMap) -> Result<AuthInfo, AppError> {
    let Some(auth_header) = headers.get("authorization") else {
        return Ok(AuthInfo::Anonymous);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::BadRequest("Authorization header is not valid text".to_string()))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(AuthInfo::Bearer(token.trim().to_string())),
        _ => Err(AppError::BadRequest(
            "Authorization header must use the Bearer scheme".to_string(),
        )),
    }
}

/// A bearer token grants administrator rights only when it matches the configured token.
/// Presenting a wrong token is an error rather than a silent downgrade to anonymous.
fn create_viewer_context(
    auth_info: AuthInfo,
    admin_token: Option<&str>,
) -> Result<ViewerContext, AppError> {
    let request_id = format!("req-{}", Uuid::new_v4());

    match auth_info {
        AuthInfo::Anonymous => Ok(ViewerContext::anonymous(request_id)),
        AuthInfo::Bearer(token) => match admin_token {
            Some(expected) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => {
                Ok(ViewerContext::administrator(request_id))
            }
            _ => Err(AppError::Forbidden("Invalid credentials".to_string())),
        },
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
