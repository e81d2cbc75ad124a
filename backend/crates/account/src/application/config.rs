//! Application Configuration
//!
//! Configuration for the Account application layer.

/// Default number of random bytes in an issued token (43 chars encoded)
pub const DEFAULT_TOKEN_BYTES_LEN: usize = 32;

/// Account application configuration
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Random bytes per issued token
    pub token_bytes_len: usize,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            password_pepper: None,
            token_bytes_len: DEFAULT_TOKEN_BYTES_LEN,
        }
    }
}

impl AccountConfig {
    /// Set the password pepper
    pub fn with_pepper(mut self, pepper: impl Into<Vec<u8>>) -> Self {
        self.password_pepper = Some(pepper.into());
        self
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
