use crate::*;
use content_inspector::ContentType;
use ed25519_dalek::ExpandedSecretKey;
use ed25519_dalek::Keypair;
use ed25519_dalek::PublicKey;
use ed25519_dalek::SecretKey;
use ed25519_dalek::Signature;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::ops::Deref;

/// Create a new poll. The coordinator named here is the only principal that may later start
/// or end it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreatePoll {
    pub poll_id: PollId,
    pub coordinator: Principal,
    pub tree_depth: usize,
    pub visibility: Visibility,

    #[serde(default)]
    pub live: bool,

    #[serde(with = "hex", default)]
    pub encrypted_info: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StartPoll {
    pub poll_id: PollId,
    pub caller: Principal,
    pub encryption_key: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EndPoll {
    pub poll_id: PollId,
    pub caller: Principal,
    pub decryption_key: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AddVoter {
    pub poll_id: PollId,
    pub caller: Principal,
    pub commitment: Field,
}

/// An anonymous vote. Carries no caller: the proof alone authorizes it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CastVote {
    pub poll_id: PollId,
    pub ballot: Ballot,
    pub nullifier: Field,
    pub proof: Proof,
}

/// This trait should be considered sealed and should not be implemented outside this crate
#[doc(hidden)]
pub trait Signable: Serialize {
    fn poll_id(&self) -> PollId;

    /// The principal that must have signed this request, if any
    fn public(&self) -> Option<Principal>;

    /// Anonymous requests are never signed, so no key can be linked to them
    fn is_anonymous(&self) -> bool {
        false
    }

    fn as_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_cbor::to_vec(&self)?)
    }
}

impl Signable for CreatePoll {
    fn poll_id(&self) -> PollId {
        self.poll_id
    }

    fn public(&self) -> Option<Principal> {
        None
    }
}

impl Signable for StartPoll {
    fn poll_id(&self) -> PollId {
        self.poll_id
    }

    fn public(&self) -> Option<Principal> {
        Some(self.caller)
    }
}

impl Signable for EndPoll {
    fn poll_id(&self) -> PollId {
        self.poll_id
    }

    fn public(&self) -> Option<Principal> {
        Some(self.caller)
    }
}

impl Signable for AddVoter {
    fn poll_id(&self) -> PollId {
        self.poll_id
    }

    fn public(&self) -> Option<Principal> {
        Some(self.caller)
    }
}

impl Signable for CastVote {
    fn poll_id(&self) -> PollId {
        self.poll_id
    }

    fn public(&self) -> Option<Principal> {
        None
    }

    fn is_anonymous(&self) -> bool {
        true
    }
}

/// A request together with a detached signature over its CBOR encoding
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(bound(deserialize = "T: Signable + Deserialize<'de>"))]
pub struct Signed<T: Signable> {
    pub tx: T,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sig: Option<SignatureBytes>,
}

impl<T: Signable> Signed<T> {
    /// Sign a request, producing a Signed<T>. Anonymous requests are wrapped unsigned.
    pub fn sign(secret: &SecretKey, request: T) -> Result<Self, Error> {
        if request.is_anonymous() {
            return Ok(Signed::unsigned(request));
        }

        let public_key = PublicKey::from(secret);
        if let Some(caller) = request.public() {
            if Principal::from(&public_key) != caller {
                return Err(Error::MismatchedPublicKeys);
            }
        }

        let serialized = request.as_bytes()?;

        let expanded = ExpandedSecretKey::from(secret);
        let signature = expanded.sign(&serialized, &public_key);

        Ok(Signed {
            tx: request,
            sig: Some(SignatureBytes(signature.to_bytes().to_vec())),
        })
    }

    /// Wrap a request that needs no signature
    pub fn unsigned(request: T) -> Self {
        Signed {
            tx: request,
            sig: None,
        }
    }

    /// Verify the signature against the request's caller.
    ///
    /// Requests without a caller pass whether or not they carry a signature.
    pub fn verify_signature(&self) -> Result<(), Error> {
        let caller = match self.tx.public() {
            Some(caller) => caller,
            None => return Ok(()),
        };
        let sig = self.sig.as_ref().ok_or(Error::MissingSignature)?;

        let serialized = self.tx.as_bytes()?;
        let signature = Signature::try_from(sig.0.as_slice())?;
        caller.to_public_key()?.verify_strict(&serialized, &signature)?;

        Ok(())
    }

    /// Get the inner unsigned request
    pub fn inner(&self) -> &T {
        &self.tx
    }
}

impl<T: Signable> Deref for Signed<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}

/// A request type
#[derive(Serialize, Deserialize, Copy, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    CreatePoll,
    StartPoll,
    EndPoll,
    AddVoter,
    CastVote,
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            RequestType::CreatePoll => "CreatePoll",
            RequestType::StartPoll => "StartPoll",
            RequestType::EndPoll => "EndPoll",
            RequestType::AddVoter => "AddVoter",
            RequestType::CastVote => "CastVote",
        };
        write!(f, "{}", name)
    }
}

macro_rules! for_each_request {
    ($value:expr, $enum:ident, $inner:ident => $body:expr) => {
        match $value {
            $enum::CreatePoll($inner) => $body,
            $enum::StartPoll($inner) => $body,
            $enum::EndPoll($inner) => $body,
            $enum::AddVoter($inner) => $body,
            $enum::CastVote($inner) => $body,
        }
    };
}

/// An unsigned request
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Request {
    CreatePoll(CreatePoll),
    StartPoll(StartPoll),
    EndPoll(EndPoll),
    AddVoter(AddVoter),
    CastVote(CastVote),
}

impl Request {
    pub fn request_type(&self) -> RequestType {
        match self {
            Request::CreatePoll(_) => RequestType::CreatePoll,
            Request::StartPoll(_) => RequestType::StartPoll,
            Request::EndPoll(_) => RequestType::EndPoll,
            Request::AddVoter(_) => RequestType::AddVoter,
            Request::CastVote(_) => RequestType::CastVote,
        }
    }

    pub fn poll_id(&self) -> PollId {
        for_each_request!(self, Request, tx => tx.poll_id)
    }

    /// Sign the request. Votes stay unsigned; other requests without a caller are signed anyway.
    pub fn sign(self, secret: &SecretKey) -> Result<SignedRequest, Error> {
        Ok(match self {
            Request::CreatePoll(tx) => SignedRequest::CreatePoll(Signed::sign(secret, tx)?),
            Request::StartPoll(tx) => SignedRequest::StartPoll(Signed::sign(secret, tx)?),
            Request::EndPoll(tx) => SignedRequest::EndPoll(Signed::sign(secret, tx)?),
            Request::AddVoter(tx) => SignedRequest::AddVoter(Signed::sign(secret, tx)?),
            Request::CastVote(tx) => SignedRequest::CastVote(Signed::sign(secret, tx)?),
        })
    }

    /// Wrap the request without signing it. Only requests without a caller will verify.
    pub fn unsigned(self) -> SignedRequest {
        match self {
            Request::CreatePoll(tx) => SignedRequest::CreatePoll(Signed::unsigned(tx)),
            Request::StartPoll(tx) => SignedRequest::StartPoll(Signed::unsigned(tx)),
            Request::EndPoll(tx) => SignedRequest::EndPoll(Signed::unsigned(tx)),
            Request::AddVoter(tx) => SignedRequest::AddVoter(Signed::unsigned(tx)),
            Request::CastVote(tx) => SignedRequest::CastVote(Signed::unsigned(tx)),
        }
    }
}

/// A signed request
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum SignedRequest {
    CreatePoll(Signed<CreatePoll>),
    StartPoll(Signed<StartPoll>),
    EndPoll(Signed<EndPoll>),
    AddVoter(Signed<AddVoter>),
    CastVote(Signed<CastVote>),
}

/// What a successfully applied request did
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "outcome")]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Created { poll_id: PollId },
    Started { poll_id: PollId },
    Ended { poll_id: PollId },
    MemberAdded { poll_id: PollId, index: u64, root: Field },
    VoteAccepted { poll_id: PollId },
}

impl SignedRequest {
    pub fn request_type(&self) -> RequestType {
        match self {
            SignedRequest::CreatePoll(_) => RequestType::CreatePoll,
            SignedRequest::StartPoll(_) => RequestType::StartPoll,
            SignedRequest::EndPoll(_) => RequestType::EndPoll,
            SignedRequest::AddVoter(_) => RequestType::AddVoter,
            SignedRequest::CastVote(_) => RequestType::CastVote,
        }
    }

    pub fn poll_id(&self) -> PollId {
        for_each_request!(self, SignedRequest, signed => signed.tx.poll_id)
    }

    pub fn verify_signature(&self) -> Result<(), Error> {
        for_each_request!(self, SignedRequest, signed => signed.verify_signature())
    }

    /// Pack into CBOR bytes
    pub fn as_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Unpack from JSON or CBOR bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let first = bytes.iter().find(|b| !b.is_ascii_whitespace());
        match (first, content_inspector::inspect(bytes)) {
            (None, _) => Err(Error::DeserializationUnknownFormat),
            (Some(b'{'), ContentType::UTF_8) => Ok(serde_json::from_slice(bytes)?),
            // CBOR maps have major type 5
            (Some(b), _) if (0xa0..=0xbf).contains(b) => Ok(serde_cbor::from_slice(bytes)?),
            _ => Err(Error::DeserializationUnknownFormat),
        }
    }

    /// Verify the signature and apply the request to the registry
    pub fn apply<H, V>(&self, registry: &mut PollRegistry<H, V>) -> Result<Outcome, Error>
    where
        H: HashPrimitive,
        V: ProofVerifier,
    {
        self.verify_signature()?;

        let outcome = match self {
            SignedRequest::CreatePoll(signed) => {
                let tx = signed.inner();
                registry.create_poll(
                    tx.poll_id,
                    tx.coordinator,
                    tx.tree_depth,
                    tx.visibility,
                    tx.live,
                    tx.encrypted_info.clone(),
                )?;
                Outcome::Created {
                    poll_id: tx.poll_id,
                }
            }
            SignedRequest::StartPoll(signed) => {
                registry.start_poll(&signed.caller, signed.poll_id, signed.encryption_key.clone())?;
                Outcome::Started {
                    poll_id: signed.poll_id,
                }
            }
            SignedRequest::EndPoll(signed) => {
                registry.end_poll(&signed.caller, signed.poll_id, signed.decryption_key.clone())?;
                Outcome::Ended {
                    poll_id: signed.poll_id,
                }
            }
            SignedRequest::AddVoter(signed) => {
                let (index, root) =
                    registry.add_voter(&signed.caller, signed.poll_id, signed.commitment)?;
                Outcome::MemberAdded {
                    poll_id: signed.poll_id,
                    index,
                    root,
                }
            }
            SignedRequest::CastVote(signed) => {
                registry.cast_vote(
                    signed.poll_id,
                    signed.ballot.clone(),
                    signed.nullifier,
                    &signed.proof,
                )?;
                Outcome::VoteAccepted {
                    poll_id: signed.poll_id,
                }
            }
        };

        Ok(outcome)
    }
}

/// Generate a fresh ed25519 keypair for a coordinator or caller
pub fn generate_keypair() -> (SecretKey, Principal) {
    let mut csprng = rand::rngs::OsRng {};
    let Keypair { public, secret } = Keypair::generate(&mut csprng);
    (secret, Principal::from(public))
}
