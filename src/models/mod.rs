// src/models/mod.rs
//! Entities owned by the credential store.

pub mod attendance;
pub mod credential;
pub mod user;
pub mod verification;
