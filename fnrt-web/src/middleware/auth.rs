//! Token authentication for private functions

use axum::http::HeaderMap;
use fnrt_config::AuthConfig;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::errors::WebError;

/// Header carrying the capability token
pub const TOKEN_HEADER: &str = "SCW-Functions-Token";

/// Spelling of [`TOKEN_HEADER`] used by older gateways
pub const LEGACY_TOKEN_HEADER: &str = "SCW_FUNCTIONS_TOKEN";

/// Scope of a token: a whole namespace or a single application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationClaim {
    #[serde(default)]
    pub namespace_id: String,
    #[serde(default)]
    pub application_id: String,
}

/// Decoded token payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "application_claim", default)]
    pub application_claims: Vec<ApplicationClaim>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// How a decoded token failed the claim checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimsViolation {
    /// No application claim at all
    Missing,
    /// More than one application claim, issued for a newer runtime
    TooMany(usize),
    /// The claim scopes another application and another namespace
    Mismatch,
}

impl std::fmt::Display for ClaimsViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimsViolation::Missing => write!(f, "no application claim"),
            ClaimsViolation::TooMany(count) => write!(f, "{} application claims, expected one", count),
            ClaimsViolation::Mismatch => write!(f, "claim does not match this deployment"),
        }
    }
}

/// Authentication failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("authentication token was not provided in the request")]
    EmptyToken,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("invalid claims: {0}")]
    InvalidClaims(ClaimsViolation),

    #[error("{0} ID was not provided")]
    MissingIdentityConfig(&'static str),
}

impl AuthError {
    /// Whether the failure comes from the deployment rather than the caller
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, AuthError::InvalidPublicKey | AuthError::MissingIdentityConfig(_))
    }
}

impl From<AuthError> for WebError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::EmptyToken => WebError::unauthorized("Unauthorized"),
            AuthError::InvalidPublicKey => WebError::internal("function runtime not setup correctly"),
            AuthError::InvalidToken(_)
            | AuthError::InvalidClaims(ClaimsViolation::Missing)
            | AuthError::InvalidClaims(ClaimsViolation::TooMany(_)) => {
                WebError::unauthorized("authorization token not valid")
            }
            AuthError::MissingIdentityConfig(_) | AuthError::InvalidClaims(ClaimsViolation::Mismatch) => {
                WebError::forbidden("Forbidden")
            }
        }
    }
}

/// Key and identity a token is checked against
#[derive(Clone)]
pub struct Credential {
    public: bool,
    key: Option<DecodingKey>,
    application_id: String,
    namespace_id: String,
}

impl Credential {
    /// Build the credential from the auth configuration
    ///
    /// A key that cannot be parsed is logged and left out; private requests
    /// are then refused with [`AuthError::InvalidPublicKey`].
    pub fn from_config(config: &AuthConfig) -> Self {
        let key = config
            .public_key_pem
            .as_deref()
            .filter(|pem| !pem.is_empty())
            .and_then(|pem| match DecodingKey::from_rsa_pem(pem.as_bytes()) {
                Ok(key) => Some(key),
                Err(e) => {
                    error!("Unable to parse the configured public key: {}", e);
                    None
                }
            });

        Self {
            public: config.public,
            key,
            application_id: config.application_id.clone(),
            namespace_id: config.namespace_id.clone(),
        }
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("public", &self.public)
            .field("has_key", &self.key.is_some())
            .field("application_id", &self.application_id)
            .field("namespace_id", &self.namespace_id)
            .finish()
    }
}

/// Gate deciding whether a request may reach the handler
#[derive(Debug, Clone)]
pub struct AuthGate {
    credential: Credential,
    validation: Validation,
}

impl AuthGate {
    pub fn new(credential: Credential) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.required_spec_claims.clear();
        validation.validate_aud = false;
        validation.validate_nbf = true;

        Self {
            credential,
            validation,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(Credential::from_config(config))
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Check the request headers against this deployment's credential
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let result = self.verify(headers);
        match &result {
            Ok(()) => {}
            Err(e) if e.is_misconfiguration() => error!("Authentication failed: {}", e),
            Err(e) => warn!("Authentication failed: {}", e),
        }
        result
    }

    fn verify(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        if self.credential.public {
            return Ok(());
        }

        let token = extract_token(headers).ok_or(AuthError::EmptyToken)?;
        let key = self.credential.key.as_ref().ok_or(AuthError::InvalidPublicKey)?;

        let claims = decode::<Claims>(token, key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?
            .claims;

        let claim = match claims.application_claims.as_slice() {
            [] => return Err(AuthError::InvalidClaims(ClaimsViolation::Missing)),
            [claim] => claim,
            many => {
                warn!("token with more claims than expected - please upgrade your runtime");
                return Err(AuthError::InvalidClaims(ClaimsViolation::TooMany(many.len())));
            }
        };

        if self.credential.application_id.is_empty() {
            return Err(AuthError::MissingIdentityConfig("application"));
        }
        if self.credential.namespace_id.is_empty() {
            return Err(AuthError::MissingIdentityConfig("namespace"));
        }

        if claim.namespace_id != self.credential.namespace_id
            && claim.application_id != self.credential.application_id
        {
            return Err(AuthError::InvalidClaims(ClaimsViolation::Mismatch));
        }

        debug!("Token accepted");
        Ok(())
    }
}

/// Token from the primary header, or the legacy one when it is absent or empty
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    [TOKEN_HEADER, LEGACY_TOKEN_HEADER]
        .into_iter()
        .filter_map(|name| headers.get(name).and_then(|value| value.to_str().ok()))
        .find(|token| !token.is_empty())
}
