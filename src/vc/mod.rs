// src/vc/mod.rs
//! Verifiable credential primitives: envelope construction and detached
//! JWT signatures over envelopes.

pub mod envelope;
pub mod signer;
