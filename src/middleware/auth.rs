//! API key authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the API key from the Authorization header
//! 2. Hash it and verify it exists in the database
//! 3. Inject the store's authentication context into the request
//! 4. Reject unauthorized requests with HTTP 401

use crate::{
    db::DbPool,
    error::AppError,
    models::api_key::{ApiKey, KeyScope},
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Authentication context attached to authenticated requests.
///
/// Every query a handler runs is filtered by `store_id`, so one store can
/// never read or change another store's data.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// ID of the authenticated API key
    pub api_key_id: Uuid,

    /// Tenant the key belongs to
    pub store_id: Uuid,

    pub store_name: String,

    pub scope: KeyScope,
}

impl AuthContext {
    /// Reject storefront keys on dashboard-only operations.
    pub fn require_admin(&self) -> Result<(), AppError> {
        match self.scope {
            KeyScope::Admin => Ok(()),
            KeyScope::Storefront => Err(AppError::Forbidden),
        }
    }
}

/// Extract the bearer token from an `Authorization` header value.
fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// SHA-256 of the raw key, hex encoded, as stored in `api_keys.key_hash`.
pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// API key authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <key>` header from request
/// 2. Hash the `<key>` using SHA-256
/// 3. Query database for matching hash where `is_active = true`
/// 4. If found: inject `AuthContext` into request, call next handler
/// 5. If not found: return 401 Unauthorized error
pub async fn auth_middleware(
    State(pool): State<DbPool>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let api_key = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or(AppError::InvalidApiKey)?;

    let key_hash = hash_api_key(api_key);

    let api_key_record = sqlx::query_as::<_, ApiKey>(
        "SELECT k.id, k.store_id, k.key_hash, k.scope, s.name AS store_name, k.created_at, k.is_active
         FROM api_keys k
         JOIN stores s ON s.id = k.store_id
         WHERE k.key_hash = $1 AND k.is_active = true",
    )
    .bind(&key_hash)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::InvalidApiKey)?;

    let auth_context = AuthContext {
        api_key_id: api_key_record.id,
        store_id: api_key_record.store_id,
        store_name: api_key_record.store_name,
        scope: KeyScope::from_db(&api_key_record.scope),
    };

    tracing::debug!(
        "Authenticated key {} for store {} ({:?})",
        auth_context.api_key_id,
        auth_context.store_name,
        auth_context.scope
    );

    // Route handlers can now extract this using Extension<AuthContext>
    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(scope: KeyScope) -> AuthContext {
        AuthContext {
            api_key_id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            store_name: "Lagos Books".into(),
            scope,
        }
    }

    #[test]
    fn parses_bearer_header() {
        assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc123"), None);
    }

    #[test]
    fn hashes_key_as_sha256_hex() {
        assert_eq!(
            hash_api_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn only_admin_scope_passes_admin_check() {
        assert!(context(KeyScope::Admin).require_admin().is_ok());
        assert!(matches!(
            context(KeyScope::Storefront).require_admin(),
            Err(AppError::Forbidden)
        ));
    }
}
