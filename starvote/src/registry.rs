use crate::*;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Owns every poll and serializes all mutation through `&mut self`.
///
/// Polls are never removed. Observers are notified after each operation commits, in commit
/// order, and never while checks are still running.
pub struct PollRegistry<H = Sha256Hasher, V = DigestVerifier> {
    config: Config,
    hasher: H,
    verifier: V,
    polls: BTreeMap<PollId, Poll>,
    observers: Vec<Box<dyn Observer>>,
}

impl Default for PollRegistry<Sha256Hasher, DigestVerifier> {
    fn default() -> Self {
        PollRegistry::new(Config::default(), Sha256Hasher, DigestVerifier)
    }
}

impl<H: HashPrimitive, V: ProofVerifier> PollRegistry<H, V> {
    pub fn new(config: Config, hasher: H, verifier: V) -> Self {
        PollRegistry {
            config,
            hasher,
            verifier,
            polls: BTreeMap::new(),
            observers: vec![],
        }
    }

    /// Register an observer for all future events
    pub fn subscribe<O: Observer + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    /// Create a new poll in the `Created` phase.
    ///
    /// The depth is checked before the id, so an unsupported depth is always reported as such.
    pub fn create_poll(
        &mut self,
        poll_id: PollId,
        coordinator: Principal,
        tree_depth: usize,
        visibility: Visibility,
        live: bool,
        encrypted_info: Vec<u8>,
    ) -> Result<(), Error> {
        if !self.config.supports_depth(tree_depth) {
            return Err(Error::UnsupportedDepth(tree_depth));
        }
        if self.polls.contains_key(&poll_id) {
            return Err(Error::DuplicatePoll(poll_id));
        }

        let poll = Poll::new(
            poll_id,
            coordinator,
            tree_depth,
            visibility,
            live,
            encrypted_info,
            &self.hasher,
        )?;
        self.polls.insert(poll_id, poll);

        info!(poll_id, tree_depth, ?visibility, "poll created");
        self.publish(Event::PollCreated {
            poll_id,
            coordinator,
        });
        Ok(())
    }

    /// Start a poll, publishing its encryption key.
    pub fn start_poll(
        &mut self,
        caller: &Principal,
        poll_id: PollId,
        encryption_key: String,
    ) -> Result<(), Error> {
        let event = self.poll_mut(poll_id)?.start(caller, encryption_key)?;

        info!(poll_id, "poll started");
        self.publish(event);
        Ok(())
    }

    /// End a poll, publishing its decryption key.
    pub fn end_poll(
        &mut self,
        caller: &Principal,
        poll_id: PollId,
        decryption_key: String,
    ) -> Result<(), Error> {
        let event = self.poll_mut(poll_id)?.end(caller, decryption_key)?;

        info!(poll_id, "poll ended");
        self.publish(event);
        Ok(())
    }

    /// Add a member commitment, returning its leaf index and the new root.
    pub fn add_voter(
        &mut self,
        caller: &Principal,
        poll_id: PollId,
        commitment: Field,
    ) -> Result<(u64, Field), Error> {
        let policy = self.config.member_policy;
        let hasher = &self.hasher;
        let poll = self
            .polls
            .get_mut(&poll_id)
            .ok_or(Error::PollNotFound(poll_id))?;
        let event = poll.add_member(caller, commitment, policy, hasher)?;
        let index = poll.number_of_leaves() - 1;
        let root = poll.merkle_root();

        debug!(poll_id, index, %root, "member added");
        self.publish(event);
        Ok((index, root))
    }

    /// Cast an anonymous vote.
    ///
    /// The caller's identity plays no part: admission is gated only by the poll phase, the
    /// nullifier and the membership proof.
    pub fn cast_vote(
        &mut self,
        poll_id: PollId,
        ballot: Ballot,
        nullifier: Field,
        proof: &Proof,
    ) -> Result<(), Error> {
        let hasher = &self.hasher;
        let verifier = &self.verifier;
        let poll = self
            .polls
            .get_mut(&poll_id)
            .ok_or(Error::PollNotFound(poll_id))?;

        let event = match poll.cast_vote(ballot, nullifier, proof, hasher, verifier) {
            Ok(event) => event,
            Err(e) => {
                warn!(poll_id, kind = %e.kind(), "vote rejected");
                return Err(e);
            }
        };

        debug!(poll_id, votes = poll.votes().len(), "vote added");
        self.publish(event);
        Ok(())
    }

    fn publish(&mut self, event: Event) {
        for observer in self.observers.iter_mut() {
            observer.notify(&event);
        }
    }

    fn poll_mut(&mut self, poll_id: PollId) -> Result<&mut Poll, Error> {
        self.polls
            .get_mut(&poll_id)
            .ok_or(Error::PollNotFound(poll_id))
    }
}

impl<H, V> PollRegistry<H, V> {
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a poll by id
    pub fn poll(&self, poll_id: PollId) -> Result<&Poll, Error> {
        self.polls.get(&poll_id).ok_or(Error::PollNotFound(poll_id))
    }

    pub fn encrypted_poll_info(&self, poll_id: PollId) -> Result<&[u8], Error> {
        Ok(self.poll(poll_id)?.encrypted_info())
    }

    pub fn is_private_poll(&self, poll_id: PollId) -> Result<bool, Error> {
        Ok(self.poll(poll_id)?.is_private())
    }

    pub fn is_live_poll(&self, poll_id: PollId) -> Result<bool, Error> {
        Ok(self.poll(poll_id)?.is_live())
    }

    /// `None` until the poll has started
    pub fn encryption_key(&self, poll_id: PollId) -> Result<Option<&str>, Error> {
        Ok(self.poll(poll_id)?.encryption_key())
    }

    /// `None` until the poll has ended
    pub fn decryption_key(&self, poll_id: PollId) -> Result<Option<&str>, Error> {
        Ok(self.poll(poll_id)?.decryption_key())
    }

    pub fn number_of_leaves(&self, poll_id: PollId) -> Result<u64, Error> {
        Ok(self.poll(poll_id)?.number_of_leaves())
    }

    pub fn merkle_root(&self, poll_id: PollId) -> Result<Field, Error> {
        Ok(self.poll(poll_id)?.merkle_root())
    }

    pub fn tree_depth(&self, poll_id: PollId) -> Result<usize, Error> {
        Ok(self.poll(poll_id)?.tree_depth())
    }

    pub fn phase(&self, poll_id: PollId) -> Result<Phase, Error> {
        Ok(self.poll(poll_id)?.phase())
    }

    pub fn coordinator(&self, poll_id: PollId) -> Result<&Principal, Error> {
        Ok(self.poll(poll_id)?.coordinator())
    }

    /// Accepted votes, in admission order
    pub fn votes(&self, poll_id: PollId) -> Result<&[VoteRecord], Error> {
        Ok(self.poll(poll_id)?.votes())
    }

    pub fn nullifier_used(&self, poll_id: PollId, nullifier: &Field) -> Result<bool, Error> {
        Ok(self.poll(poll_id)?.nullifiers().contains(nullifier))
    }

    pub fn poll_ids(&self) -> impl Iterator<Item = PollId> + '_ {
        self.polls.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.polls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polls.is_empty()
    }
}
