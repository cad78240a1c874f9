use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use error_common::codes;

use crate::error::ApiError;
use crate::middleware::AuthenticatedPrincipal;
use crate::state::AuthGateway;

pub const ADMIN_REQUIRED_MESSAGE: &str = "Admin permission is required for this action";

/// Let the request through only if the bound principal is an admin.
///
/// Must be layered inside [`AuthGateway::protect`]; without a bound
/// principal the request fails with 500.
pub async fn require_admin(
    State(gateway): State<AuthGateway>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some((user_id, is_admin)) = request
        .extensions()
        .get::<AuthenticatedPrincipal>()
        .map(|p| (p.id.clone(), p.is_admin))
    else {
        tracing::error!(
            error_code = codes::internal::CONTEXT_MISSING,
            path = %request.uri().path(),
            "require_admin ran without an authenticated principal; check middleware order"
        );
        return Err(ApiError::internal("Authenticated principal missing from request"));
    };

    if !is_admin {
        tracing::warn!(
            error_code = codes::authorization::ADMIN_REQUIRED,
            user_id = %user_id,
            path = %request.uri().path(),
            "Admin check failed"
        );
        return Err(ApiError::authorization(
            ADMIN_REQUIRED_MESSAGE,
            gateway.policy().forbidden(),
        ));
    }

    Ok(next.run(request).await)
}
