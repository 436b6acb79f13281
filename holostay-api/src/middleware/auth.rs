use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use holostay_core::identity::{Identity, IdentityResolver};
use holostay_core::{CoreError, CoreResult};
use holostay_shared::Masked;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// JWT Claims
// ============================================================================

/// Access token claims as issued by the hosted auth service
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct UserMetadata {
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
}

impl UserClaims {
    pub fn into_identity(self) -> CoreResult<Identity> {
        if self.role.as_deref() == Some("anon") {
            return Err(CoreError::IdentityError("anonymous token".to_string()));
        }

        let user_id = Uuid::parse_str(&self.sub)
            .map_err(|_| CoreError::IdentityError(format!("subject is not a user id: {}", self.sub)))?;
        let metadata = self.user_metadata;

        Ok(Identity {
            user_id,
            email: self.email.map(Masked),
            full_name: metadata.full_name.or(metadata.name).or(metadata.display_name),
        })
    }
}

// ============================================================================
// Token Verification
// ============================================================================

pub struct JwtIdentityResolver {
    secret: Masked<String>,
    audience: Option<String>,
}

impl JwtIdentityResolver {
    pub fn new(secret: Masked<String>, audience: Option<String>) -> Self {
        Self { secret, audience }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        match &self.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        validation
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve(
        &self,
        token: &str,
    ) -> Result<Identity, Box<dyn std::error::Error + Send + Sync>> {
        let token_data = decode::<UserClaims>(
            token,
            &DecodingKey::from_secret(self.secret.expose().as_bytes()),
            &self.validation(),
        )?;

        Ok(token_data.claims.into_identity()?)
    }
}

// ============================================================================
// Caller Resolution Middleware
// ============================================================================

/// The resolved caller of a request; `None` when no valid credential was sent
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Identity>);

impl Caller {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }

    pub fn require(&self) -> Result<&Identity, AppError> {
        self.0.as_ref().ok_or_else(AppError::unauthenticated)
    }
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

/// Resolves the bearer credential (if any) and injects a `Caller`
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    // Owned so the request body is not borrowed across the await
    let token = bearer_token(&req);
    let identity = match token {
        Some(token) => match state.identity.resolve(&token).await {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::debug!("Rejected bearer credential: {}", e);
                None
            }
        },
        None => None,
    };

    req.extensions_mut().insert(Caller(identity));
    next.run(req).await
}

/// Rejects requests that carry no valid credential
pub async fn require_identity_middleware(req: Request, next: Next) -> Response {
    let authenticated = req
        .extensions()
        .get::<Caller>()
        .map(|caller| caller.0.is_some())
        .unwrap_or(false);

    if !authenticated {
        return AppError::unauthenticated().into_response();
    }

    next.run(req).await
}
