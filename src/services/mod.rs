// src/services/mod.rs
pub mod accounts;
pub mod api_server;
pub mod attendance;
pub mod auth;
pub mod credential_issuer;
pub mod verifier;
