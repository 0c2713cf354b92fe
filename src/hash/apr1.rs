//! Apache MD5-crypt (`$apr1$`) derivation.
//!
//! The algorithm is APR's `apr_md5_encode()`: an MD5 variant with a
//! 1000-round stretching schedule, a custom `./0-9A-Za-z` alphabet, and a
//! fixed permutation of the final digest bytes. Output is byte-compatible
//! with `htpasswd -m` and `openssl passwd -apr1`.
//!
//! Verification never generates a salt: the salt segment of the stored hash
//! is reused and the whole string re-derived for comparison.

use md5::{Digest, Md5};

/// Scheme tag carried by every apr1 hash field.
pub const APR1_PREFIX: &str = "$apr1$";

/// Alphabet used by `to64`, shared with classic crypt (itoa64).
const ALPHABET: &[u8; 64] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// The stretching schedule runs this many extra MD5 rounds.
const ROUNDS: usize = 1000;

/// Salts longer than this are truncated, as `htpasswd` does.
const MAX_SALT_LEN: usize = 8;

/// Check `password` against a full `$apr1$salt$hash` field.
///
/// Returns `false` for anything that does not carry the apr1 prefix.
#[must_use]
pub fn verify(password: &str, hashed: &str) -> bool {
    let rest = match hashed.strip_prefix(APR1_PREFIX) {
        Some(rest) => rest,
        None => return false,
    };
    let salt = match rest.find('$') {
        Some(end) => &rest[..end],
        None => rest,
    };
    derive(password.as_bytes(), salt.as_bytes()) == hashed
}

/// Derive the full `$apr1$salt$hash` string for `password` and `salt`.
///
/// `salt` is truncated to 8 bytes. The result embeds the (truncated) salt,
/// so equality against a stored field checks both salt and digest at once.
#[must_use]
pub fn derive(password: &[u8], salt: &[u8]) -> String {
    let salt = &salt[..salt.len().min(MAX_SALT_LEN)];

    // Inner digest: password + salt + password.
    let inner = Md5::new()
        .chain_update(password)
        .chain_update(salt)
        .chain_update(password)
        .finalize();

    let mut md = Md5::new();
    md.update(password);
    md.update(APR1_PREFIX.as_bytes());
    md.update(salt);

    // One chunk of the inner digest per 16 bytes of password length.
    let mut remaining = password.len();
    while remaining > 0 {
        let take = remaining.min(inner.len());
        md.update(&inner[..take]);
        remaining -= take;
    }

    // One byte per bit of password length: NUL for odd bits, the first
    // password byte for even ones. The even branch is only reachable with a
    // non-empty password.
    let mut bits = password.len();
    while bits > 0 {
        if bits & 1 == 1 {
            md.update([0u8]);
        } else {
            md.update(&password[..1]);
        }
        bits >>= 1;
    }

    let mut digest: [u8; 16] = md.finalize().into();

    // Stretching schedule: alternate password/digest ends, salt except every
    // third round, password except every seventh.
    for round in 0..ROUNDS {
        let mut md = Md5::new();
        if round & 1 == 1 {
            md.update(password);
        } else {
            md.update(digest);
        }
        if round % 3 != 0 {
            md.update(salt);
        }
        if round % 7 != 0 {
            md.update(password);
        }
        if round & 1 == 1 {
            md.update(digest);
        } else {
            md.update(password);
        }
        digest = md.finalize().into();
    }

    format!(
        "{}{}${}",
        APR1_PREFIX,
        String::from_utf8_lossy(salt),
        encode_digest(&digest)
    )
}

/// Encode the final digest as 22 alphabet characters, applying APR's byte
/// permutation: five 24-bit groups followed by one 12-bit group.
fn encode_digest(digest: &[u8; 16]) -> String {
    const GROUPS: [[usize; 3]; 5] = [[0, 6, 12], [1, 7, 13], [2, 8, 14], [3, 9, 15], [4, 10, 5]];

    let mut out = String::with_capacity(22);
    for [hi, mid, lo] in GROUPS {
        let group = u32::from(digest[hi]) << 16 | u32::from(digest[mid]) << 8 | u32::from(digest[lo]);
        to64(&mut out, group, 4);
    }
    to64(&mut out, u32::from(digest[11]), 2);
    out
}

/// Append `n` alphabet characters encoding the low `6 * n` bits of `v`,
/// least-significant group first.
fn to64(out: &mut String, mut v: u32, n: usize) {
    for _ in 0..n {
        out.push(ALPHABET[(v & 0x3f) as usize] as char);
        v >>= 6;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Vectors generated with `openssl passwd -apr1 -salt <salt> <password>`.

    #[test]
    fn test_derive_matches_openssl() {
        assert_eq!(
            derive(b"hello", b"xlWep/gn"),
            "$apr1$xlWep/gn$6UNiHq3WE714EKfeH2X5c."
        );
        assert_eq!(
            derive(b"password", b"lZL6V/ci"),
            "$apr1$lZL6V/ci$eIMz/iKDkbtys/uU7LEK00"
        );
    }

    #[test]
    fn test_verify_htpasswd_vectors() {
        assert!(verify("ubnt", "$apr1$z.ii9bda$5iZZ8QGI3IZSONip9.jiF1"));
        assert!(verify("ubnt", "$apr1$e2Os.H4I$Oa4/Wm3KmI0hTXJAuUoeS/"));
        assert!(!verify("xxx", "$apr1$z.ii9bda$5iZZ8QGI3IZSONip9.jiF1"));
        assert!(!verify("", "$apr1$z.ii9bda$5iZZ8QGI3IZSONip9.jiF1"));
    }

    #[test]
    fn test_verify_rejects_foreign_prefix() {
        assert!(!verify("ubnt", "{SHA}tecByS63TeTWDNwG80nkzwCdrWU="));
    }

    #[test]
    fn test_salt_truncated_to_eight_bytes() {
        let long = derive(b"test", b"abcdefgh12345678");
        let short = derive(b"test", b"abcdefgh");
        assert_eq!(long, short);
    }

    #[test]
    fn test_empty_salt_roundtrip() {
        let hashed = derive(b"secret", b"");
        assert!(verify("secret", &hashed));
        assert!(!verify("other", &hashed));
    }
}
