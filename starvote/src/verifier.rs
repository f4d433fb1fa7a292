//! Proof verification boundary.
//!
//! The core never constructs or inspects membership proofs. It builds the public
//! signals a proof must bind to and hands both to a `ProofVerifier`.

use crate::*;
use digest::Digest;
use sha2::Sha256;

/// The public inputs of a vote proof, in the order the circuit expects them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicSignals {
    /// Live membership root of the poll at admission time
    pub merkle_root: Field,
    pub nullifier: Field,
    pub ballot_hash: Field,
    pub poll_hash: Field,
}

impl PublicSignals {
    /// Build the public signals for a ballot cast in a poll.
    pub fn new<H: HashPrimitive>(
        hasher: &H,
        merkle_root: Field,
        nullifier: Field,
        ballot: &Ballot,
        poll_id: PollId,
    ) -> Self {
        PublicSignals {
            merkle_root,
            nullifier,
            ballot_hash: hasher.hash_bytes(ballot.as_bytes()),
            poll_hash: hash_poll_id(hasher, poll_id),
        }
    }

    pub fn to_array(&self) -> [Field; 4] {
        [
            self.merkle_root,
            self.nullifier,
            self.ballot_hash,
            self.poll_hash,
        ]
    }
}

/// Checks a proof against an ordered set of public signals.
///
/// Implementations must be pure: no state, no callbacks, same answer for the same input.
pub trait ProofVerifier {
    fn verify(&self, proof: &Proof, signals: &PublicSignals) -> bool;
}

impl<T: ProofVerifier + ?Sized> ProofVerifier for &T {
    fn verify(&self, proof: &Proof, signals: &PublicSignals) -> bool {
        (**self).verify(proof, signals)
    }
}

const DIGEST_PROOF_TAG: &[u8] = b"starvote-digest-proof-v1";

/// Transparent development verifier.
///
/// **Provides no zero-knowledge or membership guarantees.** A proof is the tagged SHA-256
/// digest of the public signals, so anyone can produce one for any root. Use it for tests
/// and local tooling; deployments inject a real verifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct DigestVerifier;

impl DigestVerifier {
    /// Produce the only proof this verifier accepts for `signals`.
    pub fn prove(signals: &PublicSignals) -> Proof {
        let mut hasher = Sha256::new();
        hasher.update(DIGEST_PROOF_TAG);
        for signal in signals.to_array().iter() {
            hasher.update(signal.as_bytes());
        }
        Proof(hasher.finalize().to_vec())
    }
}

impl ProofVerifier for DigestVerifier {
    fn verify(&self, proof: &Proof, signals: &PublicSignals) -> bool {
        DigestVerifier::prove(signals) == *proof
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals() -> PublicSignals {
        PublicSignals::new(
            &Sha256Hasher,
            Field::from(11),
            Field::from(22),
            &Ballot::from("yes"),
            3,
        )
    }

    #[test]
    fn signal_order() {
        let signals = signals();
        let array = signals.to_array();
        assert_eq!(array[0], Field::from(11));
        assert_eq!(array[1], Field::from(22));
        assert_eq!(array[2], Sha256Hasher.hash_bytes(b"yes"));
        assert_eq!(array[3], hash_poll_id(&Sha256Hasher, 3));
    }

    #[test]
    fn digest_verifier_binds_every_signal() {
        let signals = signals();
        let proof = DigestVerifier::prove(&signals);
        assert!(DigestVerifier.verify(&proof, &signals));

        let mut stale = signals;
        stale.merkle_root = Field::from(12);
        assert!(!DigestVerifier.verify(&proof, &stale));

        let mut other_nullifier = signals;
        other_nullifier.nullifier = Field::from(23);
        assert!(!DigestVerifier.verify(&proof, &other_nullifier));

        assert!(!DigestVerifier.verify(&Proof(vec![]), &signals));
    }
}
