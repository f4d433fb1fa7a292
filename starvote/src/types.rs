use crate::*;
use ed25519_dalek::PublicKey;
use std::fmt;
use std::str::FromStr;

/// Poll identifier
pub type PollId = u64;

/// A 32-byte big-endian value: commitments, nullifiers, tree nodes and signal hashes.
#[derive(Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Field(#[serde(with = "hex")] pub [u8; 32]);

impl Field {
    pub const ZERO: Field = Field([0; 32]);

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Interpret a 256-bit digest as a big-endian integer and shift it right by 8 bits,
    /// so the result always fits the proof system's scalar field.
    pub fn from_digest(digest: &[u8]) -> Self {
        let mut bytes = [0u8; 32];
        let take = digest.len().min(31);
        bytes[32 - take..].copy_from_slice(&digest[..take]);
        Field(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<u64> for Field {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Field(bytes)
    }
}

impl From<[u8; 32]> for Field {
    fn from(bytes: [u8; 32]) -> Self {
        Field(bytes)
    }
}

/// Parses `0x`-prefixed hex (up to 32 bytes, left-padded) or a decimal `u64`.
impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(stripped) = s.strip_prefix("0x") {
            let padded = format!("{:0>64}", stripped);
            if padded.len() != 64 {
                return Err(Error::InvalidField(s.to_owned()));
            }
            let mut bytes = [0u8; 32];
            hex::decode_to_slice(&padded, &mut bytes)
                .map_err(|_| Error::InvalidField(s.to_owned()))?;
            Ok(Field(bytes))
        } else {
            let value: u64 = s.parse().map_err(|_| Error::InvalidField(s.to_owned()))?;
            Ok(Field::from(value))
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Field(0x{})", self.to_hex())
    }
}

/// Identity of a coordinator or caller: an ed25519 public key.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Principal(#[serde(with = "hex")] pub [u8; 32]);

impl Principal {
    pub fn to_public_key(&self) -> Result<PublicKey, Error> {
        Ok(PublicKey::from_bytes(&self.0)?)
    }
}

impl From<&PublicKey> for Principal {
    fn from(public_key: &PublicKey) -> Self {
        Principal(public_key.to_bytes())
    }
}

impl From<PublicKey> for Principal {
    fn from(public_key: PublicKey) -> Self {
        Principal(public_key.to_bytes())
    }
}

impl FromStr for Principal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut bytes).map_err(|_| Error::InvalidPrincipal)?;
        Ok(Principal(bytes))
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Principal({})", hex::encode(self.0))
    }
}

/// An opaque ballot. Its content is never interpreted, only hashed into the public signals.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Ballot(#[serde(with = "hex")] pub Vec<u8>);

impl Ballot {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Ballot {
    fn from(s: &str) -> Self {
        Ballot(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Ballot {
    fn from(bytes: Vec<u8>) -> Self {
        Ballot(bytes)
    }
}

/// Opaque proof bytes, only ever handed to a `ProofVerifier`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Proof(#[serde(with = "hex")] pub Vec<u8>);

impl Proof {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

// a single-purpose hex wrapper so detached signatures can be optional
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SignatureBytes(#[serde(with = "hex")] pub Vec<u8>);
