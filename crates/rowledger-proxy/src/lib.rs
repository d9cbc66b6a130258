// crates/rowledger-proxy/src/lib.rs
// ============================================================================
// Module: Rowledger Proxy Library
// Description: Composition root for the record lifecycle proxy.
// Purpose: Expose the service facade and audit event surface.
// Dependencies: rowledger-core, rowledger-config, rowledger-providers,
//               rowledger-store-sqlite
// ============================================================================

//! ## Overview
//! The proxy crate assembles the lifecycle engine into a runnable service:
//! store backend selection, credential wiring, structured audit events,
//! and the two background tasks (staleness sweeper, draft inactivity
//! watcher). A transport layer embeds [`ProxyService`] and forwards
//! consumer operations to it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod service;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditEvent;
pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::IdleAuditBridge;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::SweepAuditBridge;
pub use service::HealthReport;
pub use service::ProxyService;
pub use service::StartupError;
