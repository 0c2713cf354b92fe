//! Facade-level authentication and lookup behavior.

use filetime::{set_file_mtime, FileTime};
use htrealm::{AuthError, HtRealm, LookupError};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const HTPASSWD: &str = "\
ubnt:$apr1$z.ii9bda$5iZZ8QGI3IZSONip9.jiF1
sha-user:{SHA}tecByS63TeTWDNwG80nkzwCdrWU=
crypt-user:RtK6w4Y3jP2C.
bcrypt-user:$2y$05$bvIG6Nmid91Mu9RcmmWZfO5HJIMCT8riNW0hEp8f6/FuA2/mHZFpe
";

const HTGROUP: &str = "\
admin: ubnt
staff: ubnt sha-user crypt-user
empty:
";

fn realm_fixture(dir: &Path) -> (HtRealm, PathBuf, PathBuf) {
    let passwd = dir.join("htpasswd");
    let group = dir.join("htgroup");
    std::fs::write(&passwd, HTPASSWD).unwrap();
    std::fs::write(&group, HTGROUP).unwrap();
    let realm = HtRealm::new(&passwd).with_group_file(&group);
    (realm, passwd, group)
}

#[test]
fn test_authenticate_attaches_groups() {
    let dir = tempdir().unwrap();
    let (realm, _, _) = realm_fixture(dir.path());

    let principal = realm.authenticate("ubnt", "ubnt").unwrap();
    assert_eq!(principal.username, "ubnt");
    assert!(principal.groups.contains("admin"));
    assert!(principal.groups.contains("staff"));
    assert_eq!(principal.groups.len(), 2);

    let principal = realm.authenticate("sha-user", "ubnt").unwrap();
    assert_eq!(
        principal.groups.into_iter().collect::<Vec<_>>(),
        ["staff"]
    );
}

#[test]
fn test_every_failure_is_the_same_generic_error() {
    let dir = tempdir().unwrap();
    let (realm, _, _) = realm_fixture(dir.path());

    // Wrong password.
    assert_eq!(
        realm.authenticate("ubnt", "wrong"),
        Err(AuthError::InvalidCredentials)
    );
    // Unknown user.
    assert_eq!(
        realm.authenticate("nobody", "ubnt"),
        Err(AuthError::InvalidCredentials)
    );
    // Entry stored with an unverifiable scheme.
    assert_eq!(
        realm.authenticate("bcrypt-user", "anything"),
        Err(AuthError::InvalidCredentials)
    );
}

#[test]
fn test_lookup_user() {
    let dir = tempdir().unwrap();
    let (realm, _, _) = realm_fixture(dir.path());

    let user = realm.lookup_user("crypt-user").unwrap();
    assert_eq!(user.username, "crypt-user");
    assert_eq!(user.groups.into_iter().collect::<Vec<_>>(), ["staff"]);

    assert_eq!(
        realm.lookup_user("nobody"),
        Err(LookupError::UnknownUser("nobody".to_string()))
    );
}

#[test]
fn test_lookup_group() {
    let dir = tempdir().unwrap();
    let (realm, _, _) = realm_fixture(dir.path());

    let group = realm.lookup_group("staff").unwrap();
    assert_eq!(group.members, ["ubnt", "sha-user", "crypt-user"]);

    // A group line with no members is never stored, so it is not found.
    assert_eq!(
        realm.lookup_group("empty"),
        Err(LookupError::UnknownGroup("empty".to_string()))
    );
    assert_eq!(
        realm.lookup_group("nosuch"),
        Err(LookupError::UnknownGroup("nosuch".to_string()))
    );
}

#[test]
fn test_group_changes_are_picked_up_on_mtime_change() {
    let dir = tempdir().unwrap();
    let (realm, _, group) = realm_fixture(dir.path());
    set_file_mtime(&group, FileTime::from_unix_time(1_700_000_000, 0)).unwrap();

    assert!(realm
        .authenticate("ubnt", "ubnt")
        .unwrap()
        .groups
        .contains("admin"));

    std::fs::write(&group, "staff: ubnt\n").unwrap();
    set_file_mtime(&group, FileTime::from_unix_time(1_700_000_100, 0)).unwrap();

    let principal = realm.authenticate("ubnt", "ubnt").unwrap();
    assert!(!principal.groups.contains("admin"));
    assert_eq!(principal.groups.into_iter().collect::<Vec<_>>(), ["staff"]);
}

#[test]
fn test_deleted_group_file_keeps_serving_last_good_membership() {
    let dir = tempdir().unwrap();
    let (realm, _, group) = realm_fixture(dir.path());

    assert!(realm.lookup_group("staff").is_ok());

    std::fs::remove_file(&group).unwrap();
    let group_info = realm.lookup_group("staff").unwrap();
    assert_eq!(group_info.members.len(), 3);
}

#[test]
fn test_unconfigured_group_file_means_empty_membership() {
    let dir = tempdir().unwrap();
    let passwd = dir.path().join("htpasswd");
    std::fs::write(&passwd, HTPASSWD).unwrap();

    let realm = HtRealm::new(&passwd);
    assert!(realm.authenticate("ubnt", "ubnt").unwrap().groups.is_empty());
    assert!(realm.lookup_user("ubnt").unwrap().groups.is_empty());
    assert!(realm.lookup_group("staff").is_err());
}

#[test]
fn test_missing_group_file_fails_authentication_closed() {
    // A *configured but never-readable* group file is an error, and errors
    // during authentication surface as invalid credentials.
    let dir = tempdir().unwrap();
    let passwd = dir.path().join("htpasswd");
    std::fs::write(&passwd, HTPASSWD).unwrap();

    let realm = HtRealm::new(&passwd).with_group_file(dir.path().join("absent"));
    assert_eq!(
        realm.authenticate("ubnt", "ubnt"),
        Err(AuthError::InvalidCredentials)
    );
}
