//! One-way password digest.
//!
//! Unsalted SHA-256, hex encoded. Matches digests already stored by earlier
//! versions of the app, so it must not be reused anywhere a real security
//! boundary is expected.

use sha2::{Digest, Sha256};

/// Length of every digest returned by [`hash_password`].
pub const DIGEST_HEX_LEN: usize = 64;

/// Returns the lowercase hex SHA-256 digest of the UTF-8 `plaintext`.
pub fn hash_password(plaintext: &str) -> String {
    let digest = Sha256::digest(plaintext.as_bytes());
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::{hash_password, DIGEST_HEX_LEN};

    #[test]
    fn digest_is_stable_and_fixed_length() {
        let first = hash_password("hunter22");
        assert_eq!(first, hash_password("hunter22"));
        assert_eq!(first.len(), DIGEST_HEX_LEN);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn digest_matches_known_vector() {
        assert_eq!(
            hash_password("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn distinct_inputs_produce_distinct_digests() {
        assert_ne!(hash_password("password1"), hash_password("password2"));
        assert_ne!(hash_password(""), hash_password(" "));
    }
}
