// crates/rowledger-providers/src/credentials.rs
// ============================================================================
// Module: Credential Providers
// Description: Built-in credential providers for grid store sessions.
// Purpose: Supply service tokens from the environment or configuration.
// Dependencies: rowledger-core, base64, serde, serde_json
// ============================================================================

//! ## Overview
//! Two credential providers ship built in. [`EnvCredentialProvider`] reads a
//! base64-encoded service-account blob from a named environment variable and
//! extracts the bearer token from it; this matches how deployments inject
//! the grid credential. [`StaticCredentialProvider`] carries a literal token
//! for tests and local configuration. Failures never echo secret material
//! back in error messages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rowledger_core::AuthError;
use rowledger_core::CredentialProvider;
use rowledger_core::ServiceToken;
use serde::Deserialize;

// ============================================================================
// SECTION: Service Account Blob
// ============================================================================

/// Decoded form of the injected service-account blob.
#[derive(Debug, Deserialize)]
struct ServiceAccountBlob {
    /// Bearer token presented to the grid service.
    token: String,
}

// ============================================================================
// SECTION: Environment Provider
// ============================================================================

/// Credential provider backed by a base64 blob in an environment variable.
///
/// # Invariants
/// - The variable value must decode as base64 to a JSON object with a
///   non-empty `token` field.
/// - Error messages name the variable, never its contents.
#[derive(Debug, Clone)]
pub struct EnvCredentialProvider {
    /// Name of the environment variable holding the blob.
    variable: String,
}

impl EnvCredentialProvider {
    /// Creates a provider reading the given environment variable.
    #[must_use]
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn credentials(&self) -> Result<ServiceToken, AuthError> {
        let variable = &self.variable;
        let blob = std::env::var(variable)
            .map_err(|_| AuthError(format!("environment variable {variable} is not set")))?;
        decode_blob(variable, &blob)
    }
}

/// Decodes a base64 service-account blob into its bearer token.
///
/// The variable name appears in errors; the blob contents never do.
fn decode_blob(variable: &str, blob: &str) -> Result<ServiceToken, AuthError> {
    let decoded = STANDARD
        .decode(blob.trim())
        .map_err(|_| AuthError(format!("{variable} is not valid base64")))?;
    let account: ServiceAccountBlob = serde_json::from_slice(&decoded)
        .map_err(|_| AuthError(format!("{variable} does not decode to a service account")))?;
    if account.token.trim().is_empty() {
        return Err(AuthError(format!("{variable} carries an empty token")));
    }
    Ok(ServiceToken::new(account.token))
}

// ============================================================================
// SECTION: Static Provider
// ============================================================================

/// Credential provider carrying a literal token.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    /// Token returned on every retrieval.
    token: String,
}

impl StaticCredentialProvider {
    /// Creates a provider around the given token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn credentials(&self) -> Result<ServiceToken, AuthError> {
        if self.token.trim().is_empty() {
            return Err(AuthError("static token is empty".to_string()));
        }
        Ok(ServiceToken::new(self.token.clone()))
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use rowledger_core::CredentialProvider;

    use super::EnvCredentialProvider;
    use super::StaticCredentialProvider;
    use super::decode_blob;

    #[test]
    fn blob_with_token_decodes() {
        let blob = STANDARD.encode(r#"{"token": "grid-secret"}"#);
        let token = decode_blob("GRID_CREDENTIAL", &blob);
        assert!(matches!(token, Ok(token) if token.reveal() == "grid-secret"));
    }

    #[test]
    fn blob_that_is_not_base64_fails_without_echoing_contents() {
        let result = decode_blob("GRID_CREDENTIAL", "%%not-base64%%");
        assert!(matches!(
            result,
            Err(err) if err.0.contains("GRID_CREDENTIAL") && !err.0.contains("not-base64")
        ));
    }

    #[test]
    fn blob_that_is_not_a_service_account_fails() {
        let blob = STANDARD.encode("[1, 2, 3]");
        assert!(decode_blob("GRID_CREDENTIAL", &blob).is_err());
    }

    #[test]
    fn blob_with_blank_token_fails() {
        let blob = STANDARD.encode(r#"{"token": "  "}"#);
        assert!(matches!(
            decode_blob("GRID_CREDENTIAL", &blob),
            Err(err) if err.0.contains("empty token")
        ));
    }

    #[test]
    fn unset_variable_fails_by_name() {
        let provider = EnvCredentialProvider::new("ROWLEDGER_TEST_UNSET_CREDENTIAL");
        assert!(matches!(
            provider.credentials(),
            Err(err) if err.0.contains("ROWLEDGER_TEST_UNSET_CREDENTIAL")
        ));
    }

    #[test]
    fn static_provider_returns_its_token() {
        let provider = StaticCredentialProvider::new("literal");
        assert!(matches!(
            provider.credentials(),
            Ok(token) if token.reveal() == "literal"
        ));
    }

    #[test]
    fn static_provider_rejects_blank_tokens() {
        let provider = StaticCredentialProvider::new("   ");
        assert!(provider.credentials().is_err());
    }
}
