#[macro_use]
extern crate serde;

mod config;
mod error;
mod events;
mod hash;
mod lifecycle;
mod nullifier;
mod poll;
mod registry;
mod request;
mod tree;
mod types;
mod verifier;

pub use config::*;
pub use error::*;
pub use events::*;
pub use hash::*;
pub use lifecycle::*;
pub use nullifier::*;
pub use poll::*;
pub use registry::*;
pub use request::*;
pub use tree::*;
pub use types::*;
pub use verifier::*;

#[cfg(test)]
mod tests;
