//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `DONATIONS_*` environment variables, and an
//! optional configuration file, in that order of precedence.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::inbound::http::session_config::SessionToggles;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Runtime configuration for the donations server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DONATIONS")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. In-memory storage is used when unset.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// Path to the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`.
    pub cookie_secure: Option<bool>,
    /// `SameSite` policy for session cookies (`Strict`, `Lax`, `None`).
    pub same_site: Option<String>,
    /// Permit a generated session key when the key file is missing.
    #[ortho_config(default = false)]
    pub allow_ephemeral_session: bool,
}

impl AppSettings {
    /// Return the configured bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    /// Return the configured pool size, falling back to the default.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Return the configured session key path, falling back to the default.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Collect the raw session toggles for validation.
    pub fn session_toggles(&self) -> SessionToggles {
        SessionToggles {
            key_file: self.session_key_file(),
            cookie_secure: self.cookie_secure,
            same_site: self.same_site.clone(),
            allow_ephemeral: self.allow_ephemeral_session,
        }
    }
}
