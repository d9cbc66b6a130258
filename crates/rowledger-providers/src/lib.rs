// crates/rowledger-providers/src/lib.rs
// ============================================================================
// Module: Rowledger Providers
// Description: Built-in store and credential collaborator implementations.
// Purpose: Provide production adapters aligned with Rowledger core seams.
// Dependencies: rowledger-core, reqwest, base64, serde, serde_json
// ============================================================================

//! ## Overview
//! This crate ships the built-in production collaborators: an HTTP grid
//! store adapter and credential providers for environment-injected and
//! literal tokens. Adapters are fail-closed: bounded timeouts, response
//! size limits, and no silent retries.
//! Invariants:
//! - All transport failures surface as store errors, never panics.
//! - Credential material never appears in error messages or debug output.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod credentials;
pub mod http;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use credentials::EnvCredentialProvider;
pub use credentials::StaticCredentialProvider;
pub use http::HttpGridConfig;
pub use http::HttpGridStoreAdapter;

#[cfg(test)]
mod tests;
