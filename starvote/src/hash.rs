use crate::*;
use digest::Digest;
use sha2::Sha256;

/// A two-input collision-resistant hash used for tree nodes and public-signal hashes.
///
/// Implementations must be pure and deterministic.
pub trait HashPrimitive {
    /// Hash two nodes into their parent.
    fn hash2(&self, left: &Field, right: &Field) -> Field;

    /// Hash an arbitrary byte string into a field element.
    fn hash_bytes(&self, data: &[u8]) -> Field;
}

impl<T: HashPrimitive + ?Sized> HashPrimitive for &T {
    fn hash2(&self, left: &Field, right: &Field) -> Field {
        (**self).hash2(left, right)
    }

    fn hash_bytes(&self, data: &[u8]) -> Field {
        (**self).hash_bytes(data)
    }
}

/// SHA-256 with the digest shifted right by one byte to land in the proof field.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hasher;

impl HashPrimitive for Sha256Hasher {
    fn hash2(&self, left: &Field, right: &Field) -> Field {
        let mut hasher = Sha256::new();
        hasher.update(left.as_bytes());
        hasher.update(right.as_bytes());
        Field::from_digest(&hasher.finalize())
    }

    fn hash_bytes(&self, data: &[u8]) -> Field {
        Field::from_digest(&Sha256::digest(data))
    }
}

/// Hash of a poll id, encoded as a 32-byte big-endian integer.
///
/// Used both as the poll's empty-leaf value and as the poll's public signal.
pub fn hash_poll_id<H: HashPrimitive>(hasher: &H, poll_id: PollId) -> Field {
    hasher.hash_bytes(Field::from(poll_id).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hasher_is_deterministic_and_ordered() {
        let hasher = Sha256Hasher;
        let a = Field::from(1);
        let b = Field::from(2);

        assert_eq!(hasher.hash2(&a, &b), hasher.hash2(&a, &b));
        assert_ne!(hasher.hash2(&a, &b), hasher.hash2(&b, &a));
        assert_eq!(hasher.hash2(&a, &b).0[0], 0);
    }

    #[test]
    fn poll_hash_differs_per_poll() {
        let hasher = Sha256Hasher;
        assert_ne!(hash_poll_id(&hasher, 1), hash_poll_id(&hasher, 2));
        assert_eq!(
            hash_poll_id(&hasher, 7),
            hasher.hash_bytes(Field::from(7).as_bytes())
        );
    }
}
