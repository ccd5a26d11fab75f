//! Session token persistence. One opaque token per client context, kept
//! behind [`TokenStore`] so the auth service does not care whether it lands
//! in memory, in a storage file, or in a cookie jar.
//!
//! Stores never validate the token shape and never trigger navigation or
//! network calls.

mod cookie;
mod file;
mod memory;

pub use cookie::{cookie_value, CookieTokenStore, SESSION_COOKIE_NAME};
pub use file::{FileTokenStore, STORAGE_FILE, STORAGE_KEY};
pub use memory::MemoryTokenStore;

use crate::error::StoreError;
use secrecy::SecretString;

pub trait TokenStore: Send + Sync {
    /// Stores `token`, overwriting any previous value. An empty token is
    /// stored as is but reads back as absent.
    ///
    /// # Errors
    /// Returns an error if the backing medium cannot be written.
    fn save(&self, token: &SecretString) -> Result<(), StoreError>;

    /// Current token, `None` when absent or empty. Never fails; unreadable
    /// storage reads as absent.
    fn read(&self) -> Option<SecretString>;

    /// Removes the token. Clearing an absent token is a no-op.
    ///
    /// # Errors
    /// Returns an error if the backing medium cannot be written.
    fn clear(&self) -> Result<(), StoreError>;

    fn is_present(&self) -> bool {
        self.read().is_some()
    }
}
