// crates/rowledger-config/src/lib.rs
// ============================================================================
// Module: Rowledger Config Library
// Description: Configuration model and validation for the Rowledger proxy.
// Purpose: Expose the canonical TOML configuration surface.
// Dependencies: rowledger-core, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! One strict configuration model for the whole proxy: store backend
//! selection, credential source, sweeper and watcher intervals, and audit
//! routing. Loading is fail-closed: bounded file size, UTF-8 only, unknown
//! fields rejected, every numeric setting validated against explicit
//! bounds before the configuration is handed to the composition root.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod model;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use model::AuditConfig;
pub use model::AuditSinkKind;
pub use model::ConfigError;
pub use model::CredentialSource;
pub use model::CredentialsConfig;
pub use model::HttpStoreConfig;
pub use model::RowledgerConfig;
pub use model::SqliteBackendConfig;
pub use model::StoreBackend;
pub use model::StoreConfig;
pub use model::SweeperConfig;
pub use model::WatcherConfig;
