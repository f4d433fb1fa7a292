use crate::*;
use std::collections::BTreeSet;

/// Who may add members to a poll
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Anyone may add members
    Public,
    /// Only the coordinator may add members
    Private,
}

/// An accepted vote. Written once, never modified.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VoteRecord {
    pub poll_id: PollId,
    pub ballot: Ballot,
}

/// A single poll: lifecycle, membership tree, consumed nullifiers and the ballot log.
///
/// Every mutating method runs all of its checks before touching any state, so a failed
/// call leaves the poll exactly as it was.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Poll {
    id: PollId,
    visibility: Visibility,

    /// Reserved for live result handling; stored and reported, never interpreted.
    live: bool,

    #[serde(with = "hex")]
    encrypted_info: Vec<u8>,

    lifecycle: Lifecycle,
    tree: MembershipTree,

    // Only populated when duplicates are rejected
    members: BTreeSet<Field>,

    nullifiers: NullifierRegistry,
    votes: Vec<VoteRecord>,
}

impl Poll {
    /// Create a poll in the `Created` phase with an empty tree.
    ///
    /// The tree's empty leaf is the hash of the poll id, so two polls never share an empty root.
    pub(crate) fn new<H: HashPrimitive>(
        id: PollId,
        coordinator: Principal,
        tree_depth: usize,
        visibility: Visibility,
        live: bool,
        encrypted_info: Vec<u8>,
        hasher: &H,
    ) -> Result<Self, Error> {
        let zero_leaf = hash_poll_id(hasher, id);
        let tree = MembershipTree::new(tree_depth, zero_leaf, hasher)
            .map_err(|e| tree_error(id, e))?;

        Ok(Poll {
            id,
            visibility,
            live,
            encrypted_info,
            lifecycle: Lifecycle::new(id, coordinator),
            tree,
            members: BTreeSet::new(),
            nullifiers: NullifierRegistry::new(),
            votes: vec![],
        })
    }

    pub(crate) fn start(&mut self, caller: &Principal, encryption_key: String) -> Result<Event, Error> {
        self.lifecycle.start(caller, encryption_key.clone())?;

        Ok(Event::PollStarted {
            poll_id: self.id,
            coordinator: *self.coordinator(),
            encryption_key,
        })
    }

    pub(crate) fn end(&mut self, caller: &Principal, decryption_key: String) -> Result<Event, Error> {
        self.lifecycle.end(caller, decryption_key.clone())?;

        Ok(Event::PollEnded {
            poll_id: self.id,
            coordinator: *self.coordinator(),
            decryption_key,
        })
    }

    /// Append a member commitment to the tree.
    pub(crate) fn add_member<H: HashPrimitive>(
        &mut self,
        caller: &Principal,
        commitment: Field,
        policy: MemberPolicy,
        hasher: &H,
    ) -> Result<Event, Error> {
        self.lifecycle.check_accepting_members()?;
        if self.visibility == Visibility::Private {
            self.lifecycle.check_coordinator(caller)?;
        }

        let reject_duplicates = policy == MemberPolicy::RejectDuplicates;
        if reject_duplicates && self.members.contains(&commitment) {
            return Err(Error::DuplicateMember(self.id, commitment));
        }

        let (index, root) = self
            .tree
            .insert(commitment, hasher)
            .map_err(|e| tree_error(self.id, e))?;
        if reject_duplicates {
            self.members.insert(commitment);
        }

        Ok(Event::MemberAdded {
            poll_id: self.id,
            index,
            commitment,
            root,
        })
    }

    /// Admit a vote.
    ///
    /// Checks, in order: the poll is ongoing, the nullifier is unused, and the proof verifies
    /// against the live root. Only then is the nullifier consumed and the ballot recorded.
    pub(crate) fn cast_vote<H: HashPrimitive, V: ProofVerifier>(
        &mut self,
        ballot: Ballot,
        nullifier: Field,
        proof: &Proof,
        hasher: &H,
        verifier: &V,
    ) -> Result<Event, Error> {
        self.lifecycle.check_ongoing()?;

        if self.nullifiers.contains(&nullifier) {
            return Err(Error::ReplayDetected(self.id));
        }

        let signals = PublicSignals::new(hasher, self.tree.root(), nullifier, &ballot, self.id);
        if !verifier.verify(proof, &signals) {
            return Err(Error::InvalidProof(self.id));
        }

        self.nullifiers.insert(nullifier);
        self.votes.push(VoteRecord {
            poll_id: self.id,
            ballot: ballot.clone(),
        });

        Ok(Event::VoteAdded {
            poll_id: self.id,
            ballot,
        })
    }

    pub fn id(&self) -> PollId {
        self.id
    }

    pub fn coordinator(&self) -> &Principal {
        self.lifecycle.coordinator()
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn encrypted_info(&self) -> &[u8] {
        &self.encrypted_info
    }

    /// Set once the poll has started
    pub fn encryption_key(&self) -> Option<&str> {
        self.lifecycle.encryption_key()
    }

    /// Set once the poll has ended
    pub fn decryption_key(&self) -> Option<&str> {
        self.lifecycle.decryption_key()
    }

    pub fn tree(&self) -> &MembershipTree {
        &self.tree
    }

    pub fn merkle_root(&self) -> Field {
        self.tree.root()
    }

    pub fn number_of_leaves(&self) -> u64 {
        self.tree.len()
    }

    pub fn tree_depth(&self) -> usize {
        self.tree.depth()
    }

    pub fn nullifiers(&self) -> &NullifierRegistry {
        &self.nullifiers
    }

    pub fn votes(&self) -> &[VoteRecord] {
        &self.votes
    }
}

fn tree_error(poll_id: PollId, error: TreeError) -> Error {
    match error {
        TreeError::Full => Error::TreeFull(poll_id),
        TreeError::UnsupportedDepth(depth) => Error::UnsupportedDepth(depth),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COORDINATOR: Principal = Principal([1; 32]);
    const STRANGER: Principal = Principal([2; 32]);

    fn new_poll(visibility: Visibility, depth: usize) -> Poll {
        Poll::new(7, COORDINATOR, depth, visibility, false, b"info".to_vec(), &Sha256Hasher).unwrap()
    }

    fn proof_for(poll: &Poll, ballot: &str, nullifier: Field) -> Proof {
        let signals = PublicSignals::new(
            &Sha256Hasher,
            poll.merkle_root(),
            nullifier,
            &Ballot::from(ballot),
            poll.id(),
        );
        DigestVerifier::prove(&signals)
    }

    #[test]
    fn empty_leaf_is_derived_from_poll_id() {
        let poll = new_poll(Visibility::Public, 2);
        assert_eq!(poll.tree().zero(0), Some(hash_poll_id(&Sha256Hasher, 7)));
    }

    #[test]
    fn private_poll_rejects_strangers_without_side_effects() {
        let mut poll = new_poll(Visibility::Private, 2);
        let root = poll.merkle_root();

        let result = poll.add_member(&STRANGER, Field::from(1), MemberPolicy::RejectDuplicates, &Sha256Hasher);
        assert!(matches!(result, Err(Error::Unauthorized(7))));
        assert_eq!(poll.number_of_leaves(), 0);
        assert_eq!(poll.merkle_root(), root);

        poll.add_member(&COORDINATOR, Field::from(1), MemberPolicy::RejectDuplicates, &Sha256Hasher)
            .unwrap();
        assert_eq!(poll.number_of_leaves(), 1);
    }

    #[test]
    fn public_poll_accepts_anyone() {
        let mut poll = new_poll(Visibility::Public, 2);
        let event = poll
            .add_member(&STRANGER, Field::from(1), MemberPolicy::RejectDuplicates, &Sha256Hasher)
            .unwrap();
        assert_eq!(
            event,
            Event::MemberAdded {
                poll_id: 7,
                index: 0,
                commitment: Field::from(1),
                root: poll.merkle_root(),
            }
        );
    }

    #[test]
    fn duplicate_policy() {
        let mut poll = new_poll(Visibility::Public, 2);
        poll.add_member(&STRANGER, Field::from(1), MemberPolicy::RejectDuplicates, &Sha256Hasher)
            .unwrap();
        let root = poll.merkle_root();
        assert!(matches!(
            poll.add_member(&STRANGER, Field::from(1), MemberPolicy::RejectDuplicates, &Sha256Hasher),
            Err(Error::DuplicateMember(7, _))
        ));
        assert_eq!(poll.merkle_root(), root);

        let mut poll = new_poll(Visibility::Public, 2);
        poll.add_member(&STRANGER, Field::from(1), MemberPolicy::AllowDuplicates, &Sha256Hasher)
            .unwrap();
        poll.add_member(&STRANGER, Field::from(1), MemberPolicy::AllowDuplicates, &Sha256Hasher)
            .unwrap();
        assert_eq!(poll.number_of_leaves(), 2);
    }

    #[test]
    fn full_tree_is_capacity_exceeded() {
        let mut poll = new_poll(Visibility::Public, 1);
        for i in 0..2 {
            poll.add_member(&STRANGER, Field::from(i), MemberPolicy::RejectDuplicates, &Sha256Hasher)
                .unwrap();
        }
        let err = poll
            .add_member(&STRANGER, Field::from(9), MemberPolicy::RejectDuplicates, &Sha256Hasher)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
        assert_eq!(poll.number_of_leaves(), 2);
    }

    #[test]
    fn vote_checks_are_ordered_and_atomic() {
        let mut poll = new_poll(Visibility::Public, 2);
        poll.add_member(&STRANGER, Field::from(1), MemberPolicy::RejectDuplicates, &Sha256Hasher)
            .unwrap();

        let nullifier = Field::from(55);
        let proof = proof_for(&poll, "yes", nullifier);

        // Not started yet
        let err = poll
            .cast_vote(Ballot::from("yes"), nullifier, &proof, &Sha256Hasher, &DigestVerifier)
            .unwrap_err();
        assert!(matches!(err, Error::NotOngoing(7)));

        poll.start(&COORDINATOR, "enc".into()).unwrap();

        // Proof bound to another ballot
        let err = poll
            .cast_vote(Ballot::from("no"), nullifier, &proof, &Sha256Hasher, &DigestVerifier)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidProof(7)));
        assert!(poll.nullifiers().is_empty());
        assert!(poll.votes().is_empty());

        poll.cast_vote(Ballot::from("yes"), nullifier, &proof, &Sha256Hasher, &DigestVerifier)
            .unwrap();
        assert_eq!(poll.votes().len(), 1);

        // Replay is detected before the (now irrelevant) proof is looked at
        let err = poll
            .cast_vote(Ballot::from("no"), nullifier, &Proof(vec![]), &Sha256Hasher, &DigestVerifier)
            .unwrap_err();
        assert!(matches!(err, Error::ReplayDetected(7)));
        assert_eq!(poll.votes().len(), 1);
    }
}
