//! Session cookie configuration and validation.
//!
//! Debug builds tolerate missing toggles and fall back to an ephemeral key;
//! release builds require every toggle and a key file of at least
//! [`SESSION_KEY_MIN_LEN`] bytes.

pub mod fingerprint;

use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use tracing::warn;
use zeroize::Zeroize;

/// Minimum key file length accepted in release builds.
pub const SESSION_KEY_MIN_LEN: usize = 64;
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require explicit, valid session toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Raw session toggles, usually taken from `AppSettings`.
#[derive(Debug, Clone)]
pub struct SessionToggles {
    pub key_file: PathBuf,
    pub cookie_secure: Option<bool>,
    pub same_site: Option<String>,
    pub allow_ephemeral: bool,
}

/// Validated session settings.
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required session setting: {name}")]
    MissingSetting { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidSetting {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("same_site=None requires cookie_secure=true")]
    InsecureSameSiteNone,
    #[error("ephemeral session keys are not allowed in release builds")]
    EphemeralNotAllowed,
}

/// Validate `toggles` for the given build mode.
///
/// # Examples
///
/// ```
/// use donations::inbound::http::session_config::{BuildMode, SessionToggles, session_settings};
///
/// let toggles = SessionToggles {
///     key_file: "/nonexistent/session_key".into(),
///     cookie_secure: Some(false),
///     same_site: None,
///     allow_ephemeral: true,
/// };
/// let settings = session_settings(&toggles, BuildMode::Debug).unwrap();
/// assert!(!settings.cookie_secure);
/// ```
pub fn session_settings(
    toggles: &SessionToggles,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = cookie_secure(toggles.cookie_secure, mode)?;
    let same_site = same_site(toggles.same_site.as_deref(), mode, cookie_secure)?;
    if toggles.allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = session_key(&toggles.key_file, mode, toggles.allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn cookie_secure(value: Option<bool>, mode: BuildMode) -> Result<bool, SessionConfigError> {
    match value {
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!("cookie_secure not set; defaulting to secure");
            Ok(true)
        }
        None => Err(SessionConfigError::MissingSetting {
            name: "cookie_secure",
        }),
    }
}

fn same_site(
    value: Option<&str>,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let Some(value) = value else {
        return Ok(default_same_site);
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" if mode.is_debug() => {
            warn!("same_site=None without secure cookies; browsers may reject the cookie");
            Ok(SameSite::None)
        }
        "none" => Err(SessionConfigError::InsecureSameSiteNone),
        _ if mode.is_debug() => {
            warn!(value, "invalid same_site, using default");
            Ok(default_same_site)
        }
        _ => Err(SessionConfigError::InvalidSetting {
            name: "same_site",
            value: value.to_owned(),
            expected: SAMESITE_EXPECTED,
        }),
    }
}

fn session_key(
    path: &Path,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    match std::fs::read(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if !mode.is_debug() && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path: path.to_path_buf(),
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for session configuration validation.
    use std::io::Write;

    use rstest::{fixture, rstest};
    use tempfile::NamedTempFile;

    use super::*;

    fn key_file(len: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp key file");
        file.write_all(&vec![b'k'; len]).expect("write key");
        file
    }

    #[fixture]
    fn release_key() -> NamedTempFile {
        key_file(SESSION_KEY_MIN_LEN)
    }

    fn release_toggles(path: &Path) -> SessionToggles {
        SessionToggles {
            key_file: path.to_path_buf(),
            cookie_secure: Some(true),
            same_site: Some("Strict".to_owned()),
            allow_ephemeral: false,
        }
    }

    #[rstest]
    fn release_accepts_complete_settings(release_key: NamedTempFile) {
        let settings = session_settings(&release_toggles(release_key.path()), BuildMode::Release)
            .expect("valid settings");

        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Strict);
    }

    #[rstest]
    fn release_requires_cookie_secure(release_key: NamedTempFile) {
        let toggles = SessionToggles {
            cookie_secure: None,
            ..release_toggles(release_key.path())
        };

        let err = session_settings(&toggles, BuildMode::Release)
            .err()
            .expect("missing toggle");
        assert!(matches!(
            err,
            SessionConfigError::MissingSetting {
                name: "cookie_secure"
            }
        ));
    }

    #[rstest]
    fn release_rejects_short_key() {
        let short = key_file(SESSION_KEY_MIN_LEN - 1);

        let err = session_settings(&release_toggles(short.path()), BuildMode::Release)
            .err()
            .expect("short key");
        assert!(matches!(err, SessionConfigError::KeyTooShort { .. }));
    }

    #[rstest]
    fn release_rejects_ephemeral_keys(release_key: NamedTempFile) {
        let toggles = SessionToggles {
            allow_ephemeral: true,
            ..release_toggles(release_key.path())
        };

        let err = session_settings(&toggles, BuildMode::Release)
            .err()
            .expect("ephemeral in release");
        assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
    }

    #[rstest]
    fn release_rejects_insecure_same_site_none(release_key: NamedTempFile) {
        let toggles = SessionToggles {
            cookie_secure: Some(false),
            same_site: Some("None".to_owned()),
            ..release_toggles(release_key.path())
        };

        let err = session_settings(&toggles, BuildMode::Release)
            .err()
            .expect("insecure none");
        assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
    }

    #[rstest]
    fn release_missing_key_file_is_an_error() {
        let toggles = release_toggles(Path::new("/nonexistent/donations/session_key"));

        let err = session_settings(&toggles, BuildMode::Release)
            .err()
            .expect("missing key");
        assert!(matches!(err, SessionConfigError::KeyRead { .. }));
    }

    #[rstest]
    #[case(None, SameSite::Lax)]
    #[case(Some("bogus"), SameSite::Lax)]
    #[case(Some("strict"), SameSite::Strict)]
    fn debug_falls_back_to_defaults(#[case] same_site: Option<&str>, #[case] expected: SameSite) {
        let toggles = SessionToggles {
            key_file: PathBuf::from("/nonexistent/donations/session_key"),
            cookie_secure: None,
            same_site: same_site.map(str::to_owned),
            allow_ephemeral: false,
        };

        let settings = session_settings(&toggles, BuildMode::Debug).expect("debug defaults");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, expected);
    }

    #[rstest]
    fn key_file_contents_drive_the_key(release_key: NamedTempFile) {
        let first = session_settings(&release_toggles(release_key.path()), BuildMode::Release)
            .expect("first load");
        let second = session_settings(&release_toggles(release_key.path()), BuildMode::Release)
            .expect("second load");

        assert_eq!(
            fingerprint::key_fingerprint(&first.key),
            fingerprint::key_fingerprint(&second.key)
        );
    }
}
