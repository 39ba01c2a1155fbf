//! Authentication and authorization
//!
//! The bearer token's `sub` is the caller's nav ident. Roles decide which
//! side of the four-eyes split the caller may act on.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{Attestant, NavIdent, Saksbehandler};

use crate::error::ApiError;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (nav ident)
    pub sub: String,
    /// User's roles
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing role: {0}")]
    MissingRole(&'static str),
}

/// Role names carried in the token
pub mod roller {
    pub const SAKSBEHANDLER: &str = "saksbehandler";
    pub const ATTESTANT: &str = "attestant";
    pub const DRIFT: &str = "drift";
    pub const ADMIN: &str = "admin";
}

/// Creates a new JWT token
///
/// # Arguments
///
/// * `nav_ident` - The caller's nav ident, stored as `sub`
/// * `roles` - User's roles
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    nav_ident: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: nav_ident.to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Checks if user has required role
pub fn has_role(claims: &Claims, required_role: &str) -> bool {
    claims
        .roles
        .iter()
        .any(|r| r == required_role || r == roller::ADMIN)
}

/// The authenticated caller, taken from the claims the auth middleware stored
#[derive(Debug, Clone)]
pub struct Innlogget {
    pub nav_ident: NavIdent,
    pub claims: Claims,
}

impl Innlogget {
    fn krev(&self, rolle: &'static str) -> Result<(), ApiError> {
        if has_role(&self.claims, rolle) {
            Ok(())
        } else {
            Err(ApiError::forbidden("mangler_rolle", AuthError::MissingRole(rolle)))
        }
    }

    pub fn saksbehandler(&self) -> Result<Saksbehandler, ApiError> {
        self.krev(roller::SAKSBEHANDLER)?;
        Ok(Saksbehandler(self.nav_ident.clone()))
    }

    pub fn attestant(&self) -> Result<Attestant, ApiError> {
        self.krev(roller::ATTESTANT)?;
        Ok(Attestant(self.nav_ident.clone()))
    }

    pub fn drift(&self) -> Result<(), ApiError> {
        self.krev(roller::DRIFT)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Innlogget
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Missing credentials".to_string()))?;
        let nav_ident = NavIdent::new(claims.sub.clone())
            .map_err(|_| ApiError::Unauthorized("Token subject is not a nav ident".to_string()))?;
        Ok(Self { nav_ident, claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip() {
        let token = create_token("Z990001", vec!["saksbehandler".to_string()], SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "Z990001");
        assert!(has_role(&claims, roller::SAKSBEHANDLER));
        assert!(!has_role(&claims, roller::ATTESTANT));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token("Z990001", vec![], SECRET, 60).unwrap();
        assert!(matches!(validate_token(&token, "other"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_admin_passes_every_role_check() {
        let claims = Claims {
            sub: "Z990003".to_string(),
            roles: vec![roller::ADMIN.to_string()],
            exp: 0,
            iat: 0,
        };
        assert!(has_role(&claims, roller::SAKSBEHANDLER));
        assert!(has_role(&claims, roller::ATTESTANT));
        assert!(has_role(&claims, roller::DRIFT));
    }

    #[test]
    fn test_missing_role_is_forbidden() {
        let innlogget = Innlogget {
            nav_ident: NavIdent::new("Z990001").unwrap(),
            claims: Claims {
                sub: "Z990001".to_string(),
                roles: vec![roller::SAKSBEHANDLER.to_string()],
                exp: 0,
                iat: 0,
            },
        };
        assert!(innlogget.saksbehandler().is_ok());
        let err = innlogget.attestant().unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::FORBIDDEN);
        assert_eq!(err.kode(), "mangler_rolle");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn role_check_without_admin_only_matches_exact_role(
                tildelte in prop::collection::vec("[a-z]{3,12}", 0..4)
            ) {
                prop_assume!(!tildelte.iter().any(|r| r == roller::ADMIN));
                let claims = Claims { sub: "Z990001".to_string(), roles: tildelte.clone(), exp: 0, iat: 0 };
                for rolle in [roller::SAKSBEHANDLER, roller::ATTESTANT, roller::DRIFT] {
                    prop_assert_eq!(has_role(&claims, rolle), tildelte.iter().any(|r| r == rolle));
                }
            }
        }
    }
}
