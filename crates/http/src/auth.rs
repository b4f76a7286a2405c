//! Bearer-token guard applied to module routers.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::{self, Next},
    response::Response,
    Router,
};

use bookshop_authz::{authorize, AuthzError, Capability, TokenResolver};

use crate::error::AppError;

#[derive(Clone)]
struct CapabilityGuard {
    resolver: Arc<TokenResolver>,
    capability: Capability,
}

/// Require `capability` on every route of `router`.
///
/// The resolved [`bookshop_authz::Principal`] is inserted into the request
/// extensions for handlers that want it. Unmatched paths still fall through
/// to a plain 404.
pub fn require_capability(
    router: Router,
    resolver: Arc<TokenResolver>,
    capability: Capability,
) -> Router {
    router.route_layer(middleware::from_fn_with_state(
        CapabilityGuard {
            resolver,
            capability,
        },
        guard,
    ))
}

async fn guard(
    State(guard): State<CapabilityGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or(AuthzError::Unauthenticated)?;
    let principal = guard.resolver.resolve(token)?;

    if let Err(err) = authorize(&principal, guard.capability) {
        tracing::warn!(
            role = ?principal.role,
            capability = %guard.capability,
            "capability check failed"
        );
        return Err(err.into());
    }

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get};
    use bookshop_kernel::settings::AuthSettings;
    use tower::ServiceExt;

    fn guarded() -> Router {
        let resolver = Arc::new(TokenResolver::from_settings(&AuthSettings {
            admin_tokens: vec!["root".to_string()],
            customer_tokens: vec!["reader".to_string()],
        }));
        require_capability(
            Router::new().route("/stock", get(|| async { "secret" })),
            resolver,
            Capability::ManageStock,
        )
    }

    async fn status_for(authorization: Option<&str>) -> StatusCode {
        let mut request = axum::http::Request::builder().uri("/stock");
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        guarded()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        assert_eq!(status_for(None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(Some("Basic root")).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(Some("Bearer ")).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn customer_token_is_forbidden() {
        assert_eq!(status_for(Some("Bearer reader")).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_token_passes() {
        assert_eq!(status_for(Some("Bearer root")).await, StatusCode::OK);
    }
}
