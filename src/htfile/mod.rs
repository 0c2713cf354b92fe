//! Line-oriented `htpasswd`/`htgroup` file parsing.
//!
//! # Overview
//!
//! Apache's flat credential files share one line format: `key:value`, with
//! `#`-prefixed comment lines and blank lines ignored. This module provides
//! the [`HtFile`] trait, the capability surface a record store must offer,
//! together with the stock line loop, [`parse_records`], used by the provided
//! [`HtFile::load`] implementation. The two concrete stores are
//! [`HtPasswdFile`] and [`HtGroupFile`].
//!
//! # Format
//!
//! - Lines are trimmed before inspection.
//! - Empty lines and lines whose first character is `#` are skipped.
//! - A line without a `:` is skipped; otherwise the line splits at the
//!   *first* `:` (no escaping is supported) and both halves are trimmed.
//!
//! # Example
//!
//! ```
//! use htrealm::htfile::{HtFile, HtPasswdFile};
//!
//! let mut passwd = HtPasswdFile::new();
//! passwd.load("# staff\nalice:{SHA}2jmj7l5rSw0yVb/vlWAYkK/YBwk=\n".as_bytes())?;
//! assert!(passwd.get_password("alice").is_some());
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::BufRead;

mod group;
mod passwd;

pub use group::HtGroupFile;
pub use passwd::HtPasswdFile;

/// A store that can be populated from an ht-format file.
///
/// Implementors supply the record sink (`put`/`clear`) and the clear-on-load
/// policy; the line parsing itself comes with the trait. Mutation requires
/// `&mut self`, so a load can never be observed half-applied through a shared
/// reference.
pub trait HtFile {
    /// Store one parsed record. Both halves arrive trimmed; implementations
    /// decide whether a record is worth keeping.
    fn put(&mut self, key: &str, value: &str);

    /// Discard all stored records.
    fn clear(&mut self);

    /// Whether [`load`](Self::load) starts by clearing the store.
    ///
    /// Defaults to `true`; stores that accumulate across several sources
    /// override this via their construction-time policy.
    fn clear_on_load(&self) -> bool {
        true
    }

    /// Populate the store from `reader`.
    ///
    /// Reads the source to completion in order. On an I/O error the store may
    /// be left partially populated (records already stored stay stored); this
    /// is deliberate, not a rollback bug. Callers that need to keep the
    /// reader pass `&mut reader`.
    fn load<R: BufRead>(&mut self, reader: R) -> std::io::Result<()>
    where
        Self: Sized,
    {
        if self.clear_on_load() {
            self.clear();
        }
        parse_records(self, reader)
    }
}

/// Feed every record line of `reader` into `store.put`.
///
/// This is the loop behind [`HtFile::load`], kept free-standing so stores
/// that override `load` can still reuse it. It never clears the store.
pub fn parse_records<S: HtFile, R: BufRead>(store: &mut S, reader: R) -> std::io::Result<()> {
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (key, value) = match line.split_once(':') {
            Some(split) => split,
            None => continue,
        };
        store.put(key.trim(), value.trim());
    }
    Ok(())
}
