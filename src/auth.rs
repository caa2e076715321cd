//! Admin gate: password digest check plus a session-scoped flag.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{Result, SiteError};
use crate::store::StorageBackend;

pub const SESSION_KEY: &str = "adminAuthenticated";

pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

fn parse_digest(digest: &str) -> Result<[u8; 32]> {
    let mut out = [0u8; 32];
    hex::decode_to_slice(digest.trim(), &mut out).map_err(|e| {
        SiteError::Custom(format!("Admin password digest must be 64 hex characters: {e}"))
    })?;
    Ok(out)
}

pub struct AdminSession {
    session: Arc<dyn StorageBackend>,
    expected: Option<[u8; 32]>,
}

impl AdminSession {
    /// `password_sha256` is the hex SHA-256 of the admin password. Without
    /// one every login attempt fails.
    pub fn new(session: Arc<dyn StorageBackend>, password_sha256: Option<&str>) -> Result<Self> {
        let expected = password_sha256.map(parse_digest).transpose()?;
        if expected.is_none() {
            tracing::warn!("No admin password configured; admin login is disabled");
        }
        Ok(Self { session, expected })
    }

    /// Checks the password and, when it matches, marks the session.
    pub fn login(&self, password: &str) -> Result<bool> {
        let Some(expected) = &self.expected else {
            return Ok(false);
        };
        let provided = Sha256::digest(password.as_bytes());
        let ok: bool = provided.as_slice().ct_eq(expected.as_slice()).into();
        if ok {
            self.session.set_item(SESSION_KEY, "true")?;
            tracing::info!("Admin logged in");
        } else {
            tracing::warn!("Rejected admin login");
        }
        Ok(ok)
    }

    pub fn logout(&self) -> Result<()> {
        self.session.remove_item(SESSION_KEY)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.session.get_item(SESSION_KEY), Ok(Some(v)) if v == "true")
    }

    pub fn require(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(SiteError::Unauthorized)
        }
    }
}
