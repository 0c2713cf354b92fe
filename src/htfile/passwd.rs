//! `htpasswd` entry store and password checking.

use std::collections::BTreeMap;

use crate::hash::{self, VerifyError};

use super::HtFile;

/// Parsed view of one `htpasswd` file: username → stored hash field.
///
/// The stored field keeps its scheme prefix (`$apr1$…`, `{SHA}…`, …);
/// classification happens at verification time, never at parse time. When a
/// username occurs on several lines, the last occurrence wins.
#[derive(Debug)]
pub struct HtPasswdFile {
    entries: BTreeMap<String, String>,
    clear_on_load: bool,
}

impl HtPasswdFile {
    /// Create an empty store that clears itself at the start of each load.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clear_on_load(true)
    }

    /// Create an empty store with an explicit clear-on-load policy.
    #[must_use]
    pub fn with_clear_on_load(clear_on_load: bool) -> Self {
        Self {
            entries: BTreeMap::new(),
            clear_on_load,
        }
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The raw hash field stored for `user`, if the user exists.
    #[must_use]
    pub fn get_password(&self, user: &str) -> Option<&str> {
        self.entries.get(user).map(String::as_str)
    }

    /// Validate `password` against the stored hash for `user`.
    ///
    /// Returns `Ok(false)` for an unknown user or a non-matching password.
    /// A recognized-but-unverifiable scheme (bcrypt) is a distinct error, so
    /// callers can tell "wrong password" from "cannot check this entry".
    pub fn is_password_valid(&self, user: &str, password: &str) -> Result<bool, VerifyError> {
        match self.get_password(user) {
            Some(hashed) => hash::verify(password, hashed),
            None => Ok(false),
        }
    }
}

impl HtFile for HtPasswdFile {
    fn put(&mut self, key: &str, value: &str) {
        if key.is_empty() || value.is_empty() {
            return;
        }
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn clear_on_load(&self) -> bool {
        self.clear_on_load
    }
}

impl Default for HtPasswdFile {
    fn default() -> Self {
        Self::new()
    }
}
