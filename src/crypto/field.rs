//! Arithmetic in the prime field GF(2^255 - 19).
//!
//! Elements are held as five unsigned 51-bit limbs (radix 2^51). Every
//! arithmetic operation returns a weakly reduced element (each limb is at
//! most a few bits over 51), which keeps the next multiplication's 128-bit
//! products from overflowing. Only [`FieldElement::to_bytes`] and equality
//! perform the full reduction to the canonical representative in `[0, p)`.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

const LOW_51_BIT_MASK: u64 = (1u64 << 51) - 1;

/// An element of GF(2^255 - 19).
#[derive(Clone, Copy)]
pub struct FieldElement(pub(crate) [u64; 5]);

impl FieldElement {
    /// The additive identity.
    pub const ZERO: Self = Self([0, 0, 0, 0, 0]);

    /// The multiplicative identity.
    pub const ONE: Self = Self([1, 0, 0, 0, 0]);

    /// Builds an element from a small integer.
    pub const fn from_u64(value: u64) -> Self {
        // A u64 can spill past the first limb.
        Self([value & LOW_51_BIT_MASK, value >> 51, 0, 0, 0])
    }

    /// Propagates carries so that every limb fits in 51 bits plus a small
    /// excess. The top carry wraps around multiplied by 19, since
    /// 2^255 = 19 (mod p).
    #[inline(always)]
    fn reduce(mut limbs: [u64; 5]) -> Self {
        let c0 = limbs[0] >> 51;
        let c1 = limbs[1] >> 51;
        let c2 = limbs[2] >> 51;
        let c3 = limbs[3] >> 51;
        let c4 = limbs[4] >> 51;

        limbs[0] &= LOW_51_BIT_MASK;
        limbs[1] &= LOW_51_BIT_MASK;
        limbs[2] &= LOW_51_BIT_MASK;
        limbs[3] &= LOW_51_BIT_MASK;
        limbs[4] &= LOW_51_BIT_MASK;

        limbs[0] += c4 * 19;
        limbs[1] += c0;
        limbs[2] += c1;
        limbs[3] += c2;
        limbs[4] += c3;

        Self(limbs)
    }

    /// Decodes a 32-byte little-endian string.
    ///
    /// Bit 255 is ignored and values in `[p, 2^255)` are accepted; they are
    /// reduced the next time the element is encoded or compared. Decoding
    /// never fails.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        let load8 = |i: usize| {
            let mut word = [0u8; 8];
            word.copy_from_slice(&bytes[i..i + 8]);
            u64::from_le_bytes(word)
        };

        Self([
            load8(0) & LOW_51_BIT_MASK,
            (load8(6) >> 3) & LOW_51_BIT_MASK,
            (load8(12) >> 6) & LOW_51_BIT_MASK,
            (load8(19) >> 1) & LOW_51_BIT_MASK,
            (load8(24) >> 12) & LOW_51_BIT_MASK,
        ])
    }

    /// Encodes the canonical representative as 32 little-endian bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut limbs = Self::reduce(self.0).0;

        // Now limbs < 2^51 + 2^13 * 19, so the value is below 2p. Compute
        // q = 1 iff value + 19 >= 2^255, i.e. iff value >= p.
        let mut q = (limbs[0] + 19) >> 51;
        q = (limbs[1] + q) >> 51;
        q = (limbs[2] + q) >> 51;
        q = (limbs[3] + q) >> 51;
        q = (limbs[4] + q) >> 51;

        // value - q*p = value + 19q - q*2^255; the 2^255 term is dropped by
        // masking the top limb.
        limbs[0] += 19 * q;

        limbs[1] += limbs[0] >> 51;
        limbs[0] &= LOW_51_BIT_MASK;
        limbs[2] += limbs[1] >> 51;
        limbs[1] &= LOW_51_BIT_MASK;
        limbs[3] += limbs[2] >> 51;
        limbs[2] &= LOW_51_BIT_MASK;
        limbs[4] += limbs[3] >> 51;
        limbs[3] &= LOW_51_BIT_MASK;
        limbs[4] &= LOW_51_BIT_MASK;

        let words = [
            limbs[0] | (limbs[1] << 51),
            (limbs[1] >> 13) | (limbs[2] << 38),
            (limbs[2] >> 26) | (limbs[3] << 25),
            (limbs[3] >> 39) | (limbs[4] << 12),
        ];

        let mut out = [0u8; 32];
        for (chunk, word) in out.chunks_exact_mut(8).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }

    /// Returns `self^2`.
    #[inline]
    pub fn square(&self) -> Self {
        *self * *self
    }

    /// Returns `self^(2^k)` for `k >= 1`.
    fn pow2k(&self, k: u32) -> Self {
        debug_assert!(k > 0);
        let mut z = self.square();
        for _ in 1..k {
            z = z.square();
        }
        z
    }

    /// Returns `(self^(2^250 - 1), self^11)`, the shared prefix of the
    /// inversion addition chain.
    fn pow22501(&self) -> (Self, Self) {
        let t0 = self.square(); // 2
        let t1 = t0.square().square(); // 8
        let t2 = *self * t1; // 9
        let t3 = t0 * t2; // 11
        let t4 = t3.square(); // 22
        let t5 = t2 * t4; // 2^5 - 1
        let t6 = t5.pow2k(5); // 2^10 - 2^5
        let t7 = t6 * t5; // 2^10 - 1
        let t8 = t7.pow2k(10); // 2^20 - 2^10
        let t9 = t8 * t7; // 2^20 - 1
        let t10 = t9.pow2k(20); // 2^40 - 2^20
        let t11 = t10 * t9; // 2^40 - 1
        let t12 = t11.pow2k(10); // 2^50 - 2^10
        let t13 = t12 * t7; // 2^50 - 1
        let t14 = t13.pow2k(50); // 2^100 - 2^50
        let t15 = t14 * t13; // 2^100 - 1
        let t16 = t15.pow2k(100); // 2^200 - 2^100
        let t17 = t16 * t15; // 2^200 - 1
        let t18 = t17.pow2k(50); // 2^250 - 2^50
        let t19 = t18 * t13; // 2^250 - 1

        (t19, t3)
    }

    /// Returns the multiplicative inverse, computed as `self^(p - 2)`.
    ///
    /// The inverse of zero is defined to be zero.
    pub fn invert(&self) -> Self {
        let (t19, t3) = self.pow22501();
        let t20 = t19.pow2k(5); // 2^255 - 2^5
        t20 * t3 // 2^255 - 21 = p - 2
    }

    /// Returns true if the canonical encoding is odd. Used as the sign of
    /// the x-coordinate in point compression.
    pub fn is_negative(&self) -> bool {
        self.to_bytes()[0] & 1 == 1
    }

    /// Returns true if the element is zero modulo p.
    pub fn is_zero(&self) -> bool {
        self.to_bytes().iter().fold(0u8, |acc, b| acc | b) == 0
    }

    /// Overwrites `self` with `other` when `choice` is set, without
    /// branching on `choice`.
    #[inline]
    pub fn conditional_assign(&mut self, other: &Self, choice: bool) {
        let mask = (choice as u64).wrapping_neg();
        for (limb, rhs) in self.0.iter_mut().zip(other.0.iter()) {
            *limb ^= mask & (*limb ^ rhs);
        }
    }
}

impl Default for FieldElement {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for FieldElement {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let a = &self.0;
        let b = &rhs.0;
        Self::reduce([a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3], a[4] + b[4]])
    }
}

impl Sub for FieldElement {
    type Output = Self;

    /// Adds 16p before subtracting so no limb can underflow.
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let a = &self.0;
        let b = &rhs.0;
        Self::reduce([
            (a[0] + 36_028_797_018_963_664) - b[0],
            (a[1] + 36_028_797_018_963_952) - b[1],
            (a[2] + 36_028_797_018_963_952) - b[2],
            (a[3] + 36_028_797_018_963_952) - b[3],
            (a[4] + 36_028_797_018_963_952) - b[4],
        ])
    }
}

impl Neg for FieldElement {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::ZERO - self
    }
}

impl Mul for FieldElement {
    type Output = Self;

    /// Schoolbook multiplication with the high partial products folded back
    /// in multiplied by 19.
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        #[inline(always)]
        fn m(x: u64, y: u64) -> u128 {
            (x as u128) * (y as u128)
        }

        let a = &self.0;
        let b = &rhs.0;

        let b1_19 = b[1] * 19;
        let b2_19 = b[2] * 19;
        let b3_19 = b[3] * 19;
        let b4_19 = b[4] * 19;

        let c0 = m(a[0], b[0]) + m(a[4], b1_19) + m(a[3], b2_19) + m(a[2], b3_19) + m(a[1], b4_19);
        let mut c1 = m(a[1], b[0]) + m(a[0], b[1]) + m(a[4], b2_19) + m(a[3], b3_19) + m(a[2], b4_19);
        let mut c2 = m(a[2], b[0]) + m(a[1], b[1]) + m(a[0], b[2]) + m(a[4], b3_19) + m(a[3], b4_19);
        let mut c3 = m(a[3], b[0]) + m(a[2], b[1]) + m(a[1], b[2]) + m(a[0], b[3]) + m(a[4], b4_19);
        let mut c4 = m(a[4], b[0]) + m(a[3], b[1]) + m(a[2], b[2]) + m(a[1], b[3]) + m(a[0], b[4]);

        let mut out = [0u64; 5];

        c1 += (c0 >> 51) as u64 as u128;
        out[0] = (c0 as u64) & LOW_51_BIT_MASK;

        c2 += (c1 >> 51) as u64 as u128;
        out[1] = (c1 as u64) & LOW_51_BIT_MASK;

        c3 += (c2 >> 51) as u64 as u128;
        out[2] = (c2 as u64) & LOW_51_BIT_MASK;

        c4 += (c3 >> 51) as u64 as u128;
        out[3] = (c3 as u64) & LOW_51_BIT_MASK;

        let carry = (c4 >> 51) as u64;
        out[4] = (c4 as u64) & LOW_51_BIT_MASK;

        out[0] += carry * 19;
        out[1] += out[0] >> 51;
        out[0] &= LOW_51_BIT_MASK;

        Self(out)
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        let lhs = self.to_bytes();
        let rhs = other.to_bytes();
        lhs.iter().zip(rhs.iter()).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
    }
}

impl Eq for FieldElement {}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", hex::encode(self.to_bytes()))
    }
}
