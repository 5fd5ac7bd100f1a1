use std::collections::HashMap;
use std::sync::Arc;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::server::ErrorResponse;

/// Identity of an authenticated caller; only ever logged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub name: String,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self {
            name: "anonymous".to_string(),
        }
    }
}

/// Accepted bearer tokens, mapped to caller names.
///
/// An empty set disables the check.
#[derive(Debug, Clone, Default)]
pub struct ApiTokens {
    by_token: HashMap<String, String>,
}

impl ApiTokens {
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            by_token: pairs.into_iter().map(|(name, token)| (token, name)).collect(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.by_token.is_empty()
    }

    pub fn identify(&self, token: &str) -> Option<Caller> {
        self.by_token.get(token).map(|name| Caller { name: name.clone() })
    }
}

/// Extract the token from `Authorization: Bearer <token>`
fn extract_bearer(auth_header: &str) -> Option<&str> {
    let (scheme, token) = auth_header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        Json(ErrorResponse::new("Unauthorized")),
    )
        .into_response()
}

/// Bearer token middleware; attaches a [`Caller`] to the request
pub async fn require_bearer(
    State(tokens): State<Arc<ApiTokens>>,
    mut request: Request,
    next: Next,
) -> Response {
    if !tokens.is_enabled() {
        request.extensions_mut().insert(Caller::anonymous());
        return next.run(request).await;
    }

    let caller = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer)
        .and_then(|token| tokens.identify(token));

    match caller {
        Some(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        None => {
            tracing::debug!("Rejected request to {} without valid bearer token", request.uri().path());
            unauthorized()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer("bearer   abc123 "), Some("abc123"));
        assert_eq!(extract_bearer("Basic YWRtaW46cGFzcw=="), None);
        assert_eq!(extract_bearer("Bearer"), None);
        assert_eq!(extract_bearer("Bearer  "), None);
    }

    #[test]
    fn test_identify() {
        let tokens = ApiTokens::new(vec![("web".to_string(), "abc".to_string())]);
        assert!(tokens.is_enabled());
        assert_eq!(tokens.identify("abc"), Some(Caller { name: "web".into() }));
        assert_eq!(tokens.identify("web"), None);
        assert!(!ApiTokens::default().is_enabled());
    }
}
