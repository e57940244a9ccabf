//! Outbound HTTP clients and their shared resilience protocol.
//!
//! ARCHITECTURAL RULE: no other module performs external calls directly.
//! Everything outbound goes through these clients, and every client goes
//! through `retry::call_with_retry`.

pub mod profile;
pub mod prompts;
pub mod retry;
pub mod scoring;
