//! Session cookie key loading and validation.
//!
//! Key material comes from the file named by the server settings. Debug builds
//! may run without one and fall back to an ephemeral key; release builds
//! refuse to start so sessions survive restarts and replicas agree on the key.

use std::path::{Path, PathBuf};

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use zeroize::Zeroize;

/// Minimum key file length in bytes.
pub const SESSION_KEY_MIN_LEN: usize = 64;

const FINGERPRINT_BYTES: usize = 8;

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Ephemeral keys are tolerated with a warning.
    Debug,
    /// A key file is mandatory.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use backend::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Errors raised while loading the session key.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// Release builds need a key file.
    #[error("a session key file is required in release builds")]
    MissingKeyFile,
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key file is shorter than [`SESSION_KEY_MIN_LEN`].
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Load the cookie signing key.
///
/// # Examples
///
/// ```rust
/// use backend::inbound::http::session_config::{BuildMode, load_session_key};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let path = std::env::temp_dir().join("listshare_session_key_example");
/// std::fs::write(&path, vec![b'k'; 64])?;
/// let key = load_session_key(Some(&path), BuildMode::Release)?;
/// assert_eq!(key.master().len(), 64);
/// std::fs::remove_file(&path)?;
/// # Ok(())
/// # }
/// ```
pub fn load_session_key(path: Option<&Path>, mode: BuildMode) -> Result<Key, SessionConfigError> {
    let Some(path) = path else {
        if mode == BuildMode::Release {
            return Err(SessionConfigError::MissingKeyFile);
        }
        warn!("no session key file configured; using temporary session key (dev only)");
        return Ok(Key::generate());
    };

    let mut bytes = std::fs::read(path).map_err(|source| SessionConfigError::KeyRead {
        path: path.to_path_buf(),
        source,
    })?;
    let length = bytes.len();
    if length < SESSION_KEY_MIN_LEN {
        bytes.zeroize();
        return Err(SessionConfigError::KeyTooShort {
            path: path.to_path_buf(),
            length,
            min_len: SESSION_KEY_MIN_LEN,
        });
    }
    let key = Key::derive_from(&bytes);
    bytes.zeroize();
    info!(fingerprint = %key_fingerprint(&key), "session key loaded");
    Ok(key)
}

/// Truncated SHA-256 of the signing key, safe to log.
///
/// Operators compare fingerprints across replicas without exposing the key.
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
