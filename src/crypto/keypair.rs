//! Ed25519 keypair derivation from a 32-byte seed.

use sha2::{Digest, Sha512};

use super::edwards::EdwardsPoint;
use super::Address;

/// Length of a seed in bytes.
pub const SEED_LEN: usize = 32;

/// Length of an encoded public key in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Length of the expanded private key (`seed || public_key`).
pub const EXPANDED_PRIVATE_KEY_LEN: usize = 64;

/// An Ed25519 keypair derived deterministically from a seed.
#[derive(Clone, PartialEq, Eq)]
pub struct Keypair {
    /// The seed the keypair was derived from
    seed: [u8; SEED_LEN],
    /// Compressed public key point
    public_key: [u8; PUBLIC_KEY_LEN],
}

impl Keypair {
    /// Derives the keypair for `seed`.
    ///
    /// Process:
    /// 1. Hash the seed with SHA-512
    /// 2. Clamp the low 32 bytes of the digest into the secret scalar
    /// 3. Multiply the base point by the scalar and compress the result
    ///
    /// Every 32-byte seed is valid; the same seed always yields the same keypair.
    pub fn from_seed(seed: [u8; SEED_LEN]) -> Self {
        let digest = Sha512::digest(seed);

        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(&digest[..32]);
        clamp(&mut scalar);

        let public_key = EdwardsPoint::mul_base(&scalar).compress();

        Self { seed, public_key }
    }

    /// Returns the seed.
    pub fn seed(&self) -> &[u8; SEED_LEN] {
        &self.seed
    }

    /// Returns the compressed public key.
    #[inline]
    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    /// Returns the 64-byte expanded private key, `seed || public_key`.
    ///
    /// This is the NaCl layout, which Solana-style wallets also use for
    /// keypair files.
    pub fn expanded_private_key(&self) -> [u8; EXPANDED_PRIVATE_KEY_LEN] {
        let mut out = [0u8; EXPANDED_PRIVATE_KEY_LEN];
        out[..SEED_LEN].copy_from_slice(&self.seed);
        out[SEED_LEN..].copy_from_slice(&self.public_key);
        out
    }

    /// Returns the display address of the public key.
    #[inline]
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }

    /// Returns the seed as a hex string.
    pub fn seed_hex(&self) -> String {
        hex::encode(self.seed)
    }

    /// Returns the expanded private key as base58, the form wallets import.
    pub fn keypair_base58(&self) -> String {
        bs58::encode(self.expanded_private_key()).into_string()
    }
}

impl std::fmt::Debug for Keypair {
    // The seed is secret material; only the public half is printed.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Keypair({})", self.address())
    }
}

/// Clears the three low bits and the top bit, then sets bit 254.
#[inline]
fn clamp(scalar: &mut [u8; 32]) {
    scalar[0] &= 0b1111_1000;
    scalar[31] &= 0b0111_1111;
    scalar[31] |= 0b0100_0000;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_from_hex(s: &str) -> [u8; 32] {
        hex::decode(s).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_zero_seed_vector() {
        let keypair = Keypair::from_seed([0u8; 32]);
        assert_eq!(
            hex::encode(keypair.public_key()),
            "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29"
        );
    }

    #[test]
    fn test_rfc8032_vectors() {
        // RFC 8032 section 7.1, TEST 1 and TEST 2
        let cases = [
            (
                "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
                "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a",
            ),
            (
                "4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb",
                "3d4017c3e843895a92b70aa74d1b7ebc9c982ccf2ec4968cc0cd55f12af4660c",
            ),
        ];

        for (seed, public_key) in cases {
            let keypair = Keypair::from_seed(seed_from_hex(seed));
            assert_eq!(hex::encode(keypair.public_key()), public_key);
        }
    }

    #[test]
    fn test_deterministic() {
        let seed = seed_from_hex("0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f20");
        let a = Keypair::from_seed(seed);
        let b = Keypair::from_seed(seed);
        assert_eq!(a, b);
        assert_eq!(a.expanded_private_key(), b.expanded_private_key());
    }

    #[test]
    fn test_expanded_private_key_layout() {
        let keypair = Keypair::from_seed([7u8; 32]);
        let expanded = keypair.expanded_private_key();
        assert_eq!(&expanded[..32], keypair.seed());
        assert_eq!(&expanded[32..], keypair.public_key());
    }

    #[test]
    fn test_clamp() {
        let mut scalar = [0xffu8; 32];
        clamp(&mut scalar);
        assert_eq!(scalar[0], 0xf8);
        assert_eq!(scalar[31], 0x7f);

        let mut scalar = [0u8; 32];
        clamp(&mut scalar);
        assert_eq!(scalar[0], 0);
        assert_eq!(scalar[31], 0x40);
    }

    #[test]
    fn test_zero_seed_address() {
        let keypair = Keypair::from_seed([0u8; 32]);
        assert_eq!(keypair.address().as_str(), "4zvwRjXUKGfvwnParsHAS3HuSVzV5cA4McphgmoCtajS");
        assert_eq!(
            keypair.keypair_base58(),
            "111111111111111111111111111111114zvwRjXUKGfvwnParsHAS3HuSVzV5cA4McphgmoCtajS"
        );
    }
}
