pub mod auth;

pub use auth::{identity_middleware, require_identity_middleware, Caller, JwtIdentityResolver, UserClaims};
