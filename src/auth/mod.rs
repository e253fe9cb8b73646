pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::User;

pub use password::{hash_password, verify_password, PasswordError};

/// Claims carried by the bearer token issued at login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User id (identity principal id)
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user: &User, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                JwtError::TokenGeneration(format!("token lifetime of {} hours is out of range", expiry_hours))
            })?
            .timestamp();

        Ok(Self {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            exp,
            iat: now.timestamp(),
        })
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,
}

/// Sign a token for `user` with the configured secret and expiry
pub fn generate_jwt(user: &User, config: &AppConfig) -> Result<String, JwtError> {
    let secret = config.jwt_secret_bytes();
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let claims = Claims::new(user, config.security.jwt_expiry_hours)?;
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Check signature and expiry, returning the claims
pub fn validate_jwt(token: &str, config: &AppConfig) -> Result<Claims, JwtError> {
    let secret = config.jwt_secret_bytes();
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    decode::<Claims>(token, &DecodingKey::from_secret(secret), &Validation::new(Algorithm::HS256))
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

/// Compare a caller-supplied secret with the configured one in constant time.
///
/// Both sides are hashed first so the comparison length does not depend on input.
pub fn secret_matches(provided: &str, expected: &SecretString) -> bool {
    let a = Sha256::digest(provided.as_bytes());
    let b = Sha256::digest(expected.expose_secret().as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "0b6f5c1e-1111-4c3a-9d5e-2f0a7c9b8e21".into(),
            email: "rep@example.com".into(),
            password: None,
            name: Some("Rep".into()),
            role: Some("sales".into()),
        }
    }

    #[test]
    fn token_round_trips_claims() {
        let config = AppConfig::for_testing();
        let token = generate_jwt(&user(), &config).unwrap();
        let claims = validate_jwt(&token, &config).unwrap();

        assert_eq!(claims.sub, user().id);
        assert_eq!(claims.email, "rep@example.com");
        assert_eq!(claims.role.as_deref(), Some("sales"));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let config = AppConfig::for_testing();
        let mut other = AppConfig::for_testing();
        other.security.jwt_secret = SecretString::from("a-completely-different-secret".to_string());

        let token = generate_jwt(&user(), &other).unwrap();
        assert!(matches!(validate_jwt(&token, &config), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = AppConfig::for_testing();
        let mut claims = Claims::new(&user(), 1).unwrap();
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret_bytes()),
        )
        .unwrap();

        assert!(validate_jwt(&token, &config).is_err());
    }

    #[test]
    fn out_of_range_lifetime_is_an_error() {
        let mut config = AppConfig::for_testing();
        config.security.jwt_expiry_hours = u64::MAX / 2;

        assert!(matches!(
            generate_jwt(&user(), &config),
            Err(JwtError::TokenGeneration(_))
        ));
    }

    #[test]
    fn secret_comparison() {
        let expected = SecretString::from("test-admin-token".to_string());
        assert!(secret_matches("test-admin-token", &expected));
        assert!(!secret_matches("test-admin-toke", &expected));
        assert!(!secret_matches("", &expected));
    }
}
