//! Candidate address generation.
//!
//! Defines the `AddressGenerator` trait and the BIP-39/BIP-44 Ethereum
//! implementation used by the hunter.

pub mod mnemonic;

use crate::types::Candidate;

/// Abstraction over candidate producers.
///
/// Implementors never fail outward: internal errors are logged and the
/// sentinel candidate (`Candidate::sentinel()`) is returned instead.
pub trait AddressGenerator: Send + Sync {
    /// Produce a fresh candidate from new entropy.
    fn generate(&self) -> Candidate;
}
