use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ServiceError;

/// JWT claims for a restaurant session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (restaurant ID)
    pub sub: String,
    /// Restaurant name
    pub name: Option<String>,
    /// Restaurant email
    pub email: Option<String>,
    /// Unique token ID
    pub jti: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Not valid before timestamp
    pub nbf: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub access_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_issuer: String,
        jwt_audience: String,
        access_token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            access_token_expiration,
        }
    }
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            jwt_issuer: cfg.auth_issuer.clone(),
            jwt_audience: cfg.auth_audience.clone(),
            access_token_expiration: Duration::from_secs(cfg.jwt_expiration as u64),
        }
    }
}

/// Issued token pair returned by the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Authentication service that handles token issuance and validation
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Generate a JWT for a restaurant session
    pub fn generate_token(
        &self,
        restaurant_id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<TokenPair, ServiceError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| ServiceError::InternalError("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: restaurant_id.to_string(),
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::JwtError(e.to_string()))?;

        Ok(TokenPair {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
        })
    }

    /// Validate a JWT and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.jwt_issuer]);
        validation.set_audience(&[&self.config.jwt_audience]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                ServiceError::AuthError("Token expired".to_string())
            }
            _ => ServiceError::AuthError("Invalid token".to_string()),
        })?
        .claims;

        Ok(claims)
    }
}

/// Hashes a password with Argon2id and a random salt
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::HashError(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored Argon2 hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| ServiceError::HashError(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Authenticated restaurant extracted from the Authorization header.
///
/// Requires the request-extension `Arc<AuthService>` installed by the
/// auth middleware in `main`.
#[derive(Debug, Clone)]
pub struct AuthRestaurant {
    pub restaurant_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl<S> FromRequestParts<S> for AuthRestaurant
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_service = parts
            .extensions
            .get::<Arc<AuthService>>()
            .cloned()
            .ok_or_else(|| {
                ServiceError::InternalError("Auth service not configured".to_string())
            })?;

        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServiceError::Unauthorized("Missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ServiceError::Unauthorized("Invalid authorization header".to_string()))?;

        let claims = auth_service.validate_token(token)?;

        let restaurant_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ServiceError::AuthError("Invalid token subject".to_string()))?;

        Ok(AuthRestaurant {
            restaurant_id,
            name: claims.name,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> AuthService {
        AuthService::new(AuthConfig::new(
            "kD93mf02XplQ84hzR61vNcJw75TbGyAe29sLqVuE40oPiZxK17dSnHfM38rjCtUa".into(),
            "tablebite-api".into(),
            "tablebite-restaurants".into(),
            Duration::from_secs(3600),
        ))
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let service = test_service();
        let restaurant_id = Uuid::new_v4();

        let pair = service
            .generate_token(restaurant_id, "Mario's", "mario@example.com")
            .unwrap();
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 3600);

        let claims = service.validate_token(&pair.access_token).unwrap();
        assert_eq!(claims.sub, restaurant_id.to_string());
        assert_eq!(claims.name.as_deref(), Some("Mario's"));
        assert_eq!(claims.email.as_deref(), Some("mario@example.com"));
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let service = test_service();
        let pair = service
            .generate_token(Uuid::new_v4(), "Mario's", "mario@example.com")
            .unwrap();

        let other = AuthService::new(AuthConfig::new(
            "Zx81kQmw39RfVa02LcNs75TbGyAe64hPdJu17oEiKtUv50nHgM93rjCsXpYq28wD".into(),
            "tablebite-api".into(),
            "tablebite-restaurants".into(),
            Duration::from_secs(3600),
        ));
        assert!(other.validate_token(&pair.access_token).is_err());
    }

    #[test]
    fn token_with_wrong_audience_is_rejected() {
        let service = test_service();
        let pair = service
            .generate_token(Uuid::new_v4(), "Mario's", "mario@example.com")
            .unwrap();

        let mut other = test_service();
        other.config.jwt_audience = "another-audience".into();
        assert!(other.validate_token(&pair.access_token).is_err());
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }
}
