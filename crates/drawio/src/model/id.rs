//! Identifier and fingerprint generation.
//!
//! Document ids, page ids and etags are 20-character alphanumeric strings.
//! Where they come from is injected through [`IdSource`]: [`RandomIds`] for
//! real documents, [`SeededIds`] for reproducible output.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Length of generated identifiers.
pub const ID_LEN: usize = 20;

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Supplier of fresh identifier strings.
///
/// Any `FnMut() -> String` closure is an id source.
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

impl<F> IdSource for F
where
    F: FnMut() -> String,
{
    fn next_id(&mut self) -> String {
        self()
    }
}

/// Ids from random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> String {
        encode_alphanumeric(Uuid::new_v4().as_u128())
    }
}

/// Deterministic ids derived from a seed and a counter.
///
/// ```text
/// id_n = alnum(SHA-256(seed_le || n_le)[0:16])
/// ```
#[derive(Debug, Clone)]
pub struct SeededIds {
    seed: u64,
    counter: u64,
}

impl SeededIds {
    pub fn new(seed: u64) -> Self {
        Self { seed, counter: 0 }
    }
}

impl IdSource for SeededIds {
    fn next_id(&mut self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(self.counter.to_le_bytes());
        self.counter += 1;
        encode_alphanumeric(truncate_digest(&hasher.finalize()))
    }
}

/// Derives a fingerprint (etag) from document content.
pub fn content_fingerprint(content: &[u8]) -> String {
    encode_alphanumeric(truncate_digest(&Sha256::digest(content)))
}

fn truncate_digest(hash: &[u8]) -> u128 {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);
    u128::from_be_bytes(bytes)
}

/// Renders the low [`ID_LEN`] base-62 digits of `value`.
fn encode_alphanumeric(mut value: u128) -> String {
    let mut digits = [0u8; ID_LEN];
    for digit in digits.iter_mut().rev() {
        *digit = ALPHABET[(value % 62) as usize];
        value /= 62;
    }
    digits.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_id(s: &str) -> bool {
        s.len() == ID_LEN && s.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    #[test]
    fn test_random_ids_shape() {
        let mut ids = RandomIds;
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(is_id(&a), "{a}");
        assert!(is_id(&b), "{b}");
        assert_ne!(a, b);
    }

    #[test]
    fn test_seeded_ids_deterministic() {
        let mut first = SeededIds::new(7);
        let mut second = SeededIds::new(7);
        let a: Vec<String> = (0..3).map(|_| first.next_id()).collect();
        let b: Vec<String> = (0..3).map(|_| second.next_id()).collect();
        assert_eq!(a, b);
        assert_ne!(a[0], a[1]);
        assert!(a.iter().all(|id| is_id(id)));

        assert_ne!(SeededIds::new(8).next_id(), a[0]);
    }

    #[test]
    fn test_closure_source() {
        let mut n = 0;
        let mut source = || {
            n += 1;
            format!("id{n}")
        };
        assert_eq!(source.next_id(), "id1");
        assert_eq!(source.next_id(), "id2");
    }

    #[test]
    fn test_content_fingerprint() {
        let a = content_fingerprint(b"<mxGraphModel/>");
        assert!(is_id(&a));
        assert_eq!(a, content_fingerprint(b"<mxGraphModel/>"));
        assert_ne!(a, content_fingerprint(b"<mxGraphModel dx=\"1\"/>"));
    }

    #[test]
    fn test_encode_alphanumeric_padding() {
        assert_eq!(encode_alphanumeric(0), "0".repeat(ID_LEN));
        assert_eq!(encode_alphanumeric(61), format!("{}z", "0".repeat(ID_LEN - 1)));
    }
}
