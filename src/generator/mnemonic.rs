//! BIP-39 mnemonic → BIP-44 Ethereum address generator.
//!
//! Each call draws 128 bits from the OS CSPRNG, encodes them as a 12-word
//! English mnemonic, derives the seed (empty passphrase) and the first
//! account key at `m/44'/60'/0'/0/0`, and returns its EIP-55 address.

use alloy_primitives::Address;
use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use rand::RngCore;
use std::str::FromStr;
use tracing::warn;

use super::AddressGenerator;
use crate::types::{Candidate, GenerationError};

/// Entropy drawn per candidate (128 bits → 12 words).
pub const ENTROPY_BYTES: usize = 16;

/// Standard Ethereum account path.
pub const ETH_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Characters of the mnemonic kept in the diagnostic summary.
const SUMMARY_CHARS: usize = 20;

pub struct MnemonicGenerator {
    path: DerivationPath,
}

impl MnemonicGenerator {
    pub fn new() -> Result<Self, GenerationError> {
        Self::with_path(ETH_DERIVATION_PATH)
    }

    pub fn with_path(path: &str) -> Result<Self, GenerationError> {
        let path = DerivationPath::from_str(path)
            .map_err(|e| GenerationError::Derivation(format!("invalid path {path}: {e}")))?;
        Ok(Self { path })
    }

    /// Deterministically derive a candidate from raw entropy.
    pub fn derive(&self, entropy: &[u8]) -> Result<Candidate, GenerationError> {
        let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)
            .map_err(|e| GenerationError::Mnemonic(e.to_string()))?;
        let seed = mnemonic.to_seed("");

        let child = XPrv::derive_from_path(seed, &self.path)
            .map_err(|e| GenerationError::Derivation(e.to_string()))?;
        let point = child.private_key().verifying_key().to_encoded_point(false);

        // Uncompressed SEC1 point: 0x04 || X || Y
        let address = Address::from_raw_public_key(&point.as_bytes()[1..]);

        Ok(Candidate::new(
            summarize(&mnemonic.to_string()),
            address.to_checksum(None),
        ))
    }

    fn try_generate(&self) -> Result<Candidate, GenerationError> {
        let mut entropy = [0u8; ENTROPY_BYTES];
        OsRng
            .try_fill_bytes(&mut entropy)
            .map_err(|e| GenerationError::Entropy(e.to_string()))?;
        self.derive(&entropy)
    }
}

impl AddressGenerator for MnemonicGenerator {
    fn generate(&self) -> Candidate {
        match self.try_generate() {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(error = %e, "Candidate generation failed, using sentinel");
                Candidate::sentinel()
            }
        }
    }
}

fn summarize(phrase: &str) -> String {
    let head: String = phrase.chars().take(SUMMARY_CHARS).collect();
    format!("{head}...")
}
