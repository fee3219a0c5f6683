//! Authentication configuration

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Identity of this deployment and the key its tokens are checked against
///
/// Missing ids or a missing key are not rejected here: a private function
/// without them still starts, and every request is refused by the
/// authentication gate instead.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Whether the function accepts unauthenticated calls
    pub public: bool,

    /// PEM encoded RSA public key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_pem: Option<String>,

    /// Application identifier of this deployment
    pub application_id: String,

    /// Namespace identifier of this deployment
    pub namespace_id: String,
}

impl Validatable for AuthConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(pem) = &self.public_key_pem {
            if !pem.contains("-----BEGIN") {
                log::warn!("Configured public key does not look like PEM; private calls will be rejected");
            }
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "auth"
    }
}
