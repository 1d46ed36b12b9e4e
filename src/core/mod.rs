//! Core - shared state built once at startup

pub mod context;

pub use context::AuditContext;
