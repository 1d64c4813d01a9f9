//! Token issuance and verification.
//!
//! Verification is a pure function of (token, secret): no storage access.
//! The three kinds are separated by distinct secrets, so a refresh token can
//! never pass as an access token and vice versa.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use configs::JwtConfig;
use models::enums::{UserRole, UserType};

use super::domain::Principal;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub user_type: UserType,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id,
            email: self.email.clone(),
            role: self.role,
            user_type: self.user_type,
        }
    }
}

/// Signs and verifies the three token kinds from explicit configuration.
#[derive(Clone)]
pub struct TokenSigner {
    cfg: JwtConfig,
}

impl TokenSigner {
    pub fn new(cfg: JwtConfig) -> Self {
        Self { cfg }
    }

    fn issue(&self, principal: &Principal, secret: &str, ttl_secs: i64) -> Result<String, ServiceError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: principal.user_id,
            email: principal.email.clone(),
            role: principal.role,
            user_type: principal.user_type,
            iat: now,
            exp: now + ttl_secs,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .map_err(|e| ServiceError::Token(e.to_string()))
    }

    fn verify(&self, token: &str, secret: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
            .map(|data| data.claims)
            .map_err(|e| ServiceError::Token(e.to_string()))
    }

    pub fn issue_access(&self, principal: &Principal) -> Result<String, ServiceError> {
        self.issue(principal, &self.cfg.access_secret, self.cfg.access_expiry_secs)
    }

    pub fn issue_refresh(&self, principal: &Principal) -> Result<String, ServiceError> {
        self.issue(principal, &self.cfg.refresh_secret, self.cfg.refresh_expiry_secs)
    }

    pub fn issue_reset(&self, principal: &Principal) -> Result<String, ServiceError> {
        self.issue(principal, &self.cfg.reset_secret, self.cfg.reset_expiry_secs)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, ServiceError> {
        self.verify(token, &self.cfg.access_secret)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, ServiceError> {
        self.verify(token, &self.cfg.refresh_secret)
    }

    pub fn verify_reset(&self, token: &str) -> Result<Claims, ServiceError> {
        self.verify(token, &self.cfg.reset_secret)
    }
}
