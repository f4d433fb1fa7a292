use crate::*;

use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("starvote: poll {0} not found")]
    PollNotFound(PollId),

    #[error("starvote: poll {0} already exists")]
    DuplicatePoll(PollId),

    #[error("starvote: commitment {1} is already a member of poll {0}")]
    DuplicateMember(PollId, Field),

    #[error("starvote: caller is not the coordinator of poll {0}")]
    Unauthorized(PollId),

    #[error("starvote: poll {0} has already been started")]
    AlreadyStarted(PollId),

    #[error("starvote: poll {0} is not ongoing")]
    NotOngoing(PollId),

    #[error("starvote: nullifier has already been used in poll {0}")]
    ReplayDetected(PollId),

    #[error("starvote: invalid proof for poll {0}")]
    InvalidProof(PollId),

    #[error("starvote: membership tree of poll {0} is full")]
    TreeFull(PollId),

    #[error("starvote: merkle tree depth {0} is not supported")]
    UnsupportedDepth(usize),

    #[error("starvote: invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("starvote: invalid field element: {0}")]
    InvalidField(String),

    #[error("starvote: invalid principal - expected 32 bytes of hex")]
    InvalidPrincipal,

    #[error("starvote: signature error: {0}")]
    SignatureError(#[from] ed25519_dalek::SignatureError),

    #[error("starvote: mismatched public keys")]
    MismatchedPublicKeys,

    #[error("starvote: request must be signed by its caller")]
    MissingSignature,

    #[error("starvote: CBOR error: {0}")]
    CBOR(#[from] serde_cbor::Error),

    #[error("starvote: JSON error: {0}")]
    JSON(#[from] serde_json::Error),

    #[error("starvote: error deserializing request: unknown format")]
    DeserializationUnknownFormat,
}

/// The kind of an error, for callers that branch on cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Duplicate,
    Unauthorized,
    InvalidPhase,
    CryptoRejected,
    Replay,
    CapacityExceeded,
    UnsupportedParameter,
    InvalidRequest,
    Configuration,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PollNotFound(_) => ErrorKind::NotFound,
            Error::DuplicatePoll(_) | Error::DuplicateMember(..) => ErrorKind::Duplicate,
            Error::Unauthorized(_) => ErrorKind::Unauthorized,
            Error::AlreadyStarted(_) | Error::NotOngoing(_) => ErrorKind::InvalidPhase,
            Error::InvalidProof(_) => ErrorKind::CryptoRejected,
            Error::ReplayDetected(_) => ErrorKind::Replay,
            Error::TreeFull(_) => ErrorKind::CapacityExceeded,
            Error::UnsupportedDepth(_) => ErrorKind::UnsupportedParameter,
            Error::InvalidConfig(_) => ErrorKind::Configuration,
            Error::InvalidField(_)
            | Error::InvalidPrincipal
            | Error::SignatureError(_)
            | Error::MismatchedPublicKeys
            | Error::MissingSignature
            | Error::CBOR(_)
            | Error::JSON(_)
            | Error::DeserializationUnknownFormat => ErrorKind::InvalidRequest,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::InvalidPhase => "invalid_phase",
            ErrorKind::CryptoRejected => "crypto_rejected",
            ErrorKind::Replay => "replay",
            ErrorKind::CapacityExceeded => "capacity_exceeded",
            ErrorKind::UnsupportedParameter => "unsupported_parameter",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::Configuration => "configuration",
        };
        write!(f, "{}", name)
    }
}
