//! Base58 display addresses for Ed25519 public keys.

use std::fmt;

use super::keypair::PUBLIC_KEY_LEN;

/// Upper bound on an address length in bytes. Patterns and results are
/// sized against this bound.
pub const MAX_ADDRESS_LEN: usize = 48;

/// The Base58 alphabet (Bitcoin ordering).
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// A Base58-encoded public key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Encodes a public key. A 32-byte key encodes to at most 44
    /// characters, so the result always fits [`MAX_ADDRESS_LEN`].
    #[inline]
    pub fn from_public_key(public_key: &[u8; PUBLIC_KEY_LEN]) -> Self {
        let encoded = bs58::encode(public_key).into_string();
        debug_assert!(encoded.len() <= MAX_ADDRESS_LEN);
        Self(encoded)
    }

    /// Returns the address text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the address length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the address is empty (never the case for an encoded key).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the address, returning the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns true if `c` can appear in a Base58 address.
#[inline]
pub fn is_base58_char(c: char) -> bool {
    BASE58_ALPHABET.contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_zero_key() {
        let addr = Address::from_public_key(&[0u8; 32]);
        assert_eq!(addr.as_str(), "11111111111111111111111111111111");
        assert_eq!(addr.len(), 32);
    }

    #[test]
    fn test_max_key_fits_bound() {
        let addr = Address::from_public_key(&[0xffu8; 32]);
        assert_eq!(addr.len(), 44);
        assert!(addr.len() <= MAX_ADDRESS_LEN);
        assert!(addr.as_str().chars().all(is_base58_char));
    }

    #[test]
    fn test_alphabet_excludes_ambiguous() {
        for c in ['0', 'O', 'I', 'l'] {
            assert!(!is_base58_char(c));
        }
        assert_eq!(BASE58_ALPHABET.len(), 58);
    }
}
