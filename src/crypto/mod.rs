//! Cryptographic operations for Ed25519 key and address generation.
//!
//! This module provides:
//! - Arithmetic over GF(2^255 - 19)
//! - Edwards curve point operations and fixed-base scalar multiplication
//! - Seed to keypair derivation (SHA-512, clamping, compression)
//! - Base58 address encoding

mod address;
mod edwards;
mod field;
mod keypair;

pub use address::{is_base58_char, Address, BASE58_ALPHABET, MAX_ADDRESS_LEN};
pub use edwards::EdwardsPoint;
pub use field::FieldElement;
pub use keypair::{Keypair, EXPANDED_PRIVATE_KEY_LEN, PUBLIC_KEY_LEN, SEED_LEN};
