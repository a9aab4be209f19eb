//! Plaintext secret handed back to callers.

use std::fmt;

use zeroize::Zeroizing;

/// A decrypted secret value.
///
/// The bytes are zeroed on drop. Debug and Display both emit `[REDACTED]`
/// to prevent accidental logging.
pub struct DecryptedSecret {
    inner: Zeroizing<Vec<u8>>,
}

impl DecryptedSecret {
    pub(crate) fn new(inner: Zeroizing<Vec<u8>>) -> Self {
        Self { inner }
    }

    /// Expose the plaintext bytes. Use sparingly.
    pub fn expose(&self) -> &[u8] {
        &self.inner
    }

    /// Plaintext as UTF-8, if it is valid UTF-8.
    pub fn expose_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.inner).ok()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for DecryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for DecryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
