//! Environment variable credential source.
//!
//! Read-only: values are set through the shell or service manager, never
//! written back. Empty and non-Unicode values count as unset.

use secrecy::SecretString;

use super::CredentialSource;

pub struct EnvCredentialSource;

impl EnvCredentialSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EnvCredentialSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialSource for EnvCredentialSource {
    fn get(&self, key: &str) -> Option<SecretString> {
        match std::env::var(key) {
            Ok(val) if !val.trim().is_empty() => Some(SecretString::from(val)),
            Ok(_) => None,
            Err(std::env::VarError::NotPresent) => None,
            // Present but not valid Unicode -- unusable as a header value.
            Err(std::env::VarError::NotUnicode(_)) => None,
        }
    }
}
