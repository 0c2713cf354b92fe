//! Authentication and lookup facade over the cached file stores.
//!
//! # Overview
//!
//! [`HtRealm`] composes one cached [`HtPasswdFile`] and, optionally, one
//! cached [`HtGroupFile`], and answers the three questions a host framework
//! asks: is this username/password pair valid, does this user exist, and who
//! belongs to this group. Successful answers carry group membership resolved
//! from the group file; a realm without a group file reports empty
//! membership everywhere.
//!
//! # Error discipline
//!
//! [`authenticate`](HtRealm::authenticate) collapses every failure (wrong
//! password, unknown user, an entry hashed with an unsupported scheme, an
//! unreadable password file) into the single
//! [`AuthError::InvalidCredentials`]. Callers cannot tell the cases apart,
//! and must not be able to: distinguishing them would leak account state to
//! whoever is probing. The distinction is logged instead.

use std::collections::BTreeSet;
use std::path::PathBuf;

use thiserror::Error;

use crate::cache::CachedHtFile;
use crate::config::RealmConfig;
use crate::htfile::{HtGroupFile, HtPasswdFile};

/// Authentication failure. Deliberately carries no detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The username/password pair was not accepted.
    #[error("invalid username or password")]
    InvalidCredentials,
}

/// Failure of a user or group lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No password entry exists for the user.
    #[error("user {0:?} does not exist")]
    UnknownUser(String),
    /// No group of that name has any members.
    #[error("group {0:?} does not exist")]
    UnknownGroup(String),
}

/// An authenticated identity: the username and every group it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Authenticated username.
    pub username: String,
    /// Names of all groups whose member list contains the username.
    pub groups: BTreeSet<String>,
}

/// A user known to the realm, looked up without credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    /// Username as it appears in the password file.
    pub username: String,
    /// Names of all groups whose member list contains the username.
    pub groups: BTreeSet<String>,
}

/// A group known to the realm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    /// Group name as it appears in the group file.
    pub name: String,
    /// Members in file order, duplicates preserved. Never empty.
    pub members: Vec<String>,
}

/// Security realm backed by `htpasswd` (and optionally `htgroup`) files.
///
/// Construction never touches the filesystem; files are read lazily and
/// re-read only when their modification time changes.
///
/// # Example
///
/// ```no_run
/// use htrealm::realm::HtRealm;
///
/// let realm = HtRealm::new("/etc/nginx/.htpasswd").with_group_file("/etc/nginx/.htgroup");
/// let principal = realm.authenticate("alice", "secret")?;
/// println!("{} is in {} groups", principal.username, principal.groups.len());
/// # Ok::<(), htrealm::realm::AuthError>(())
/// ```
#[derive(Debug)]
pub struct HtRealm {
    passwd: CachedHtFile<HtPasswdFile>,
    groups: Option<CachedHtFile<HtGroupFile>>,
}

impl HtRealm {
    /// Create a realm over the given `htpasswd` file, with no group file.
    pub fn new(htpasswd: impl Into<PathBuf>) -> Self {
        Self {
            passwd: CachedHtFile::new(htpasswd),
            groups: None,
        }
    }

    /// Attach an `htgroup` file for membership resolution.
    #[must_use]
    pub fn with_group_file(mut self, htgroup: impl Into<PathBuf>) -> Self {
        self.groups = Some(CachedHtFile::new(htgroup));
        self
    }

    /// Build a realm from a [`RealmConfig`].
    #[must_use]
    pub fn from_config(config: &RealmConfig) -> Self {
        let realm = Self::new(&config.passwd_file);
        match &config.group_file {
            Some(group_file) => realm.with_group_file(group_file),
            None => realm,
        }
    }

    /// Validate credentials and build the caller's [`Principal`].
    ///
    /// Any failure along the way yields [`AuthError::InvalidCredentials`];
    /// see the module docs for why.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        let checked = self
            .passwd
            .read(|passwd| passwd.is_password_valid(username, password));
        match checked {
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => {
                log::debug!("invalid credentials for user {username:?}");
                return Err(AuthError::InvalidCredentials);
            }
            Ok(Err(err)) => {
                log::warn!("cannot verify password for user {username:?}: {err}");
                return Err(AuthError::InvalidCredentials);
            }
            Err(err) => {
                log::warn!("htpasswd lookup failed: {err}");
                return Err(AuthError::InvalidCredentials);
            }
        }

        let groups = self.groups_of(username).map_err(|err| {
            log::warn!("htgroup lookup failed: {err}");
            AuthError::InvalidCredentials
        })?;

        Ok(Principal {
            username: username.to_string(),
            groups,
        })
    }

    /// Look up a user without checking credentials.
    ///
    /// Succeeds iff the user has a password entry; the entry itself is not
    /// exposed. Backing-store failures are reported as an unknown user, with
    /// the real cause logged.
    pub fn lookup_user(&self, username: &str) -> Result<UserInfo, LookupError> {
        let unknown = || LookupError::UnknownUser(username.to_string());

        let exists = self
            .passwd
            .read(|passwd| passwd.get_password(username).is_some())
            .map_err(|err| {
                log::warn!("htpasswd lookup failed: {err}");
                unknown()
            })?;
        if !exists {
            return Err(unknown());
        }

        let groups = self.groups_of(username).map_err(|err| {
            log::warn!("htgroup lookup failed: {err}");
            unknown()
        })?;

        Ok(UserInfo {
            username: username.to_string(),
            groups,
        })
    }

    /// Look up a group and its member list.
    ///
    /// Succeeds iff the group file is configured and holds the group with at
    /// least one member (a memberless group line is never stored).
    pub fn lookup_group(&self, name: &str) -> Result<GroupInfo, LookupError> {
        let unknown = || LookupError::UnknownGroup(name.to_string());

        let cache = self.groups.as_ref().ok_or_else(unknown)?;
        let members = cache
            .read(|groups| groups.get_users(name).map(<[String]>::to_vec))
            .map_err(|err| {
                log::warn!("htgroup lookup failed: {err}");
                unknown()
            })?
            .ok_or_else(unknown)?;

        Ok(GroupInfo {
            name: name.to_string(),
            members,
        })
    }

    /// All groups containing `user`, or the empty set when no group file is
    /// configured.
    fn groups_of(&self, user: &str) -> Result<BTreeSet<String>, crate::cache::CacheError> {
        match &self.groups {
            Some(cache) => cache.read(|groups| groups.get_groups(user).into_iter().collect()),
            None => Ok(BTreeSet::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realm_without_group_file_reports_empty_membership() {
        let dir = tempfile::tempdir().unwrap();
        let passwd = dir.path().join("htpasswd");
        std::fs::write(&passwd, "ubnt:{SHA}tecByS63TeTWDNwG80nkzwCdrWU=\n").unwrap();

        let realm = HtRealm::new(&passwd);
        let principal = realm.authenticate("ubnt", "ubnt").unwrap();
        assert!(principal.groups.is_empty());

        assert_eq!(
            realm.lookup_group("admin"),
            Err(LookupError::UnknownGroup("admin".to_string()))
        );
    }

    #[test]
    fn test_missing_passwd_file_is_invalid_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let realm = HtRealm::new(dir.path().join("absent"));
        assert_eq!(
            realm.authenticate("ubnt", "ubnt"),
            Err(AuthError::InvalidCredentials)
        );
    }
}
