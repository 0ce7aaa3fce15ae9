use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::Entitlement;

/// Entitlement key that applies to every entity
pub const ANY_ENTITY: &str = "*";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub entitlements: BTreeMap<String, Vec<Entitlement>>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: impl Into<String>, entitlements: BTreeMap<String, Vec<Entitlement>>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: sub.into(),
            entitlements,
            exp,
            iat: now.timestamp(),
        }
    }

    /// Whether the claims list `entitlement` for `entity` (case-insensitive) or for `*`
    pub fn grants(&self, entity: &str, entitlement: Entitlement) -> bool {
        self.entitlements
            .iter()
            .filter(|(key, _)| key.as_str() == ANY_ENTITY || key.eq_ignore_ascii_case(entity))
            .any(|(_, granted)| granted.contains(&entitlement))
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidToken(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidToken(msg) => write!(f, "Invalid JWT token: {}", msg),
            JwtError::InvalidSecret => write!(f, "JWT secret not configured"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

/// Parses a grant of the form `Entity:Create,Read` (or `*:Read`)
pub fn parse_grant(raw: &str) -> Result<(String, Vec<Entitlement>), String> {
    let (entity, list) = raw
        .split_once(':')
        .ok_or_else(|| format!("grant '{}' must look like Entity:Create,Read", raw))?;
    let entity = entity.trim();
    if entity.is_empty() {
        return Err(format!("grant '{}' has no entity", raw));
    }

    let entitlements = list
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect::<Result<Vec<Entitlement>, _>>()?;
    Ok((entity.to_string(), entitlements))
}

/// Decides whether an authenticated caller may perform an operation on an entity
pub trait EntitlementPolicy: Send + Sync + 'static {
    fn is_entitled(&self, claims: &Claims, entity: &str, entitlement: Entitlement) -> bool;
}

/// Grants exactly what the token's `entitlements` claim lists
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimsPolicy;

impl EntitlementPolicy for ClaimsPolicy {
    fn is_entitled(&self, claims: &Claims, entity: &str, entitlement: Entitlement) -> bool {
        claims.grants(entity, entitlement)
    }
}
