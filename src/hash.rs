//! Keyed summation Merkle hashing.
//!
//! Two distinct preimage shapes are used for leaves and for internal nodes
//! so that a leaf hash can never collide with an internal-node hash under a
//! first- or second-preimage attack: a leaf hashes a formatted
//! `"<code>:<value>"` string twice, an internal node hashes its children's
//! digests together with the verifier key mixed in twice.

use sha2::{
    Digest as _,
    Sha256,
};

use crate::format::Node;

/// Per-leaf personalisation value.
///
/// Reserved for a future keyed derivation (see [`leaf_hash`]'s formatting
/// contract); returns `0` for every position, matching the source
/// placeholder exactly.
#[must_use]
pub fn data_code(_position: u32) -> u64 {
    0
}

/// Computes the leaf hash for the leaf at `position` with value `value`.
///
/// Forms `"<code>:<value>"` — `code` as 16 lowercase hex digits,
/// zero-padded, `value` as a signed base-10 decimal with a leading `-` only
/// when negative — and returns `SHA256(SHA256(formatted))`.
#[must_use]
pub fn leaf_hash(position: u32, value: i64) -> [u8; 32] {
    let code = data_code(position);
    let formatted = format!("{code:016x}:{value}");
    let once: [u8; 32] = Sha256::digest(formatted.as_bytes()).into();
    Sha256::digest(once).into()
}

/// Computes the parent node of `left` and `right`.
///
/// `parent.value` is the wrapping 64-bit sum of the children's values.
/// `parent.digest` is `SHA256(SHA256(LE(parent.value) || key || left.digest
/// || right.digest) || key)`, where the `key` segment is omitted entirely
/// (not replaced by a sentinel) when `verifier_key` is empty.
#[must_use]
pub fn combine(verifier_key: &[u8], left: &Node, right: &Node) -> Node {
    let value = left.value.wrapping_add(right.value);

    let mut first = Sha256::new();
    first.update(value.to_le_bytes());
    if !verifier_key.is_empty() {
        first.update(verifier_key);
    }
    first.update(left.digest);
    first.update(right.digest);
    let h1: [u8; 32] = first.finalize().into();

    let mut second = Sha256::new();
    second.update(h1);
    if !verifier_key.is_empty() {
        second.update(verifier_key);
    }
    let digest: [u8; 32] = second.finalize().into();

    Node {
        digest,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_hash_is_deterministic() {
        assert_eq!(leaf_hash(0, 1000), leaf_hash(0, 1000));
    }

    #[test]
    fn leaf_hash_depends_on_value_not_just_position() {
        assert_ne!(leaf_hash(0, 1000), leaf_hash(0, 1001));
    }

    #[test]
    fn leaf_hash_is_independent_of_verifier_key() {
        // leaf_hash takes no key argument at all: this is an API-level
        // guarantee that leaf digests never depend on the verifier key.
        assert_eq!(leaf_hash(4, -2000), leaf_hash(4, -2000));
    }

    #[test]
    fn combine_value_is_wrapping_sum() {
        let left = Node {
            digest: [1; 32],
            value: i64::MAX,
        };
        let right = Node {
            digest: [2; 32],
            value: 1,
        };
        let parent = combine(b"", &left, &right);
        assert_eq!(parent.value, i64::MAX.wrapping_add(1));
    }

    #[test]
    fn combine_digest_changes_with_verifier_key() {
        let left = Node {
            digest: leaf_hash(0, 1000),
            value: 1000,
        };
        let right = Node {
            digest: leaf_hash(1, 2000),
            value: 2000,
        };
        let alpha = combine(b"alpha", &left, &right);
        let beta = combine(b"beta", &left, &right);
        let none = combine(b"", &left, &right);
        assert_ne!(alpha.digest, beta.digest);
        assert_ne!(alpha.digest, none.digest);
    }

    #[test]
    fn combine_digest_same_key_is_deterministic() {
        let left = Node {
            digest: leaf_hash(0, 1000),
            value: 1000,
        };
        let right = Node {
            digest: leaf_hash(1, 2000),
            value: 2000,
        };
        assert_eq!(combine(b"alpha", &left, &right), combine(b"alpha", &left, &right));
    }
}
