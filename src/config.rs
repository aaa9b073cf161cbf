// src/config.rs
//! Runtime configuration.
//!
//! Settings are layered with the `config` crate: built-in defaults first,
//! then `SHIKSHA_*` environment variables (e.g. `SHIKSHA_BIND_ADDR`), then
//! the signing secret from `JWT_SECRET`.
//!
//! ## Environment Variables
//! - `JWT_SECRET`: shared secret for credential and session tokens
//! - `SHIKSHA_BIND_ADDR`: listen address (default: 127.0.0.1:3000)
//! - `SHIKSHA_SESSION_TTL_HOURS`: session token lifetime (default: 24)
//! - `SHIKSHA_CREDENTIAL_VALIDITY_YEARS`: signature token lifetime (default: 10)
//! - `SHIKSHA_REGISTRAR_ISSUER`: issuer URI for manually issued credentials
//! - `SHIKSHA_ATTENDANCE_ISSUER`: issuer URI for attendance credentials
//! - `SHIKSHA_SEED_DEMO_DATA`: seed the demo admin and student (default: true)

use config::{Config, Environment};
use log::warn;
use serde::Deserialize;
use std::fmt;

use crate::error::WalletError;

/// Secret used when `JWT_SECRET` is unset. Not safe for production.
pub const FALLBACK_JWT_SECRET: &str = "shiksha-wallet-secret-key";

pub const DEFAULT_REGISTRAR_ISSUER: &str = "https://csvtu.ac.in/registrar";
pub const DEFAULT_ATTENDANCE_ISSUER: &str = "https://csvtu.ac.in/attendance";

#[derive(Clone, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    #[serde(default)]
    jwt_secret: Option<String>,
    pub session_ttl_hours: i64,
    pub credential_validity_years: i64,
    pub registrar_issuer: String,
    pub attendance_issuer: String,
    pub seed_demo_data: bool,
}

impl Settings {
    /// Loads settings from defaults and the process environment.
    ///
    /// Logs a warning when falling back to the built-in signing secret.
    pub fn load() -> Result<Self, WalletError> {
        let settings: Settings = Config::builder()
            .set_default("bind_addr", "127.0.0.1:3000")?
            .set_default("session_ttl_hours", 24_i64)?
            .set_default("credential_validity_years", 10_i64)?
            .set_default("registrar_issuer", DEFAULT_REGISTRAR_ISSUER)?
            .set_default("attendance_issuer", DEFAULT_ATTENDANCE_ISSUER)?
            .set_default("seed_demo_data", true)?
            .add_source(Environment::with_prefix("SHIKSHA"))
            .set_override_option("jwt_secret", std::env::var("JWT_SECRET").ok())?
            .build()?
            .try_deserialize()?;

        if settings.jwt_secret.is_none() {
            warn!("JWT_SECRET is not set, using the built-in fallback secret; do not run this in production");
        }
        Ok(settings)
    }

    /// Replaces the signing secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn jwt_secret(&self) -> &str {
        self.jwt_secret.as_deref().unwrap_or(FALLBACK_JWT_SECRET)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            bind_addr: "127.0.0.1:3000".into(),
            jwt_secret: None,
            session_ttl_hours: 24,
            credential_validity_years: 10,
            registrar_issuer: DEFAULT_REGISTRAR_ISSUER.into(),
            attendance_issuer: DEFAULT_ATTENDANCE_ISSUER.into(),
            seed_demo_data: true,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("credential_validity_years", &self.credential_validity_years)
            .field("registrar_issuer", &self.registrar_issuer)
            .field("attendance_issuer", &self.attendance_issuer)
            .field("seed_demo_data", &self.seed_demo_data)
            .finish()
    }
}
