//! Remembered login credentials in the OS keychain.
//!
//! This is a convenience for the login prompt only. The session token in
//! [`super::TokenStore`] is the authentication state; the keychain entry just
//! saves retyping the password.

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "pixelport";

pub struct CredentialStore;

impl CredentialStore {
    /// Remember the password for a username.
    pub fn store(username: &str, password: &str) -> Result<()> {
        Self::entry(username)?
            .set_password(password)
            .context("Failed to store password in keychain")
    }

    /// Recall the remembered password for a username.
    pub fn get_password(username: &str) -> Result<String> {
        Self::entry(username)?
            .get_password()
            .context("No remembered password in keychain")
    }

    /// Whether a password is remembered for this username.
    pub fn has_credentials(username: &str) -> bool {
        Self::entry(username)
            .map(|e| e.get_password().is_ok())
            .unwrap_or(false)
    }

    fn entry(username: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, username).context("Failed to open keychain entry")
    }
}
