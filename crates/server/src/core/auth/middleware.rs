use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Request header carrying the access token (no `Bearer` scheme).
pub const TOKEN_HEADER: &str = "access-token";

pub async fn mw_require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    debug!("MIDDLEWARE: require_auth");

    let token = match req.headers().get(TOKEN_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(|_| Error::AuthFailInvalidToken(super::TokenError::Malformed))?,
        None => return Err(Error::AuthFailNoToken),
    };

    if token.is_empty() {
        return Err(Error::AuthFailNoToken);
    }

    let user_id = state.tokens.verify(token).map_err(|e| {
        debug!("[Auth] Rejected token: {}", e);
        Error::AuthFailInvalidToken(e)
    })?;

    req.extensions_mut().insert(Ctx::new(user_id));

    Ok(next.run(req).await)
}
