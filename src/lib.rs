// src/lib.rs

//! # Shiksha Wallet
//!
//! Issues, stores and verifies signed student credentials, and turns
//! attendance check-ins into attendance credentials.
//!
//! ## Layers
//! 1. **Models**: users, credentials, attendance records, verification logs
//! 2. **Storage**: the async [`storage::Storage`] trait and its in-memory backend
//! 3. **VC**: credential envelopes and their JWT signatures
//! 4. **Services**: issuance, verification, attendance, accounts and the HTTP API

pub mod config;   // Runtime settings
pub mod error;    // Domain and HTTP errors
pub mod models;   // Data structures
pub mod services; // Business logic and API
pub mod storage;  // Credential store
pub mod utils;    // Helper functions
pub mod vc;       // Envelope and signature primitives
