//! Points on the twisted Edwards curve -x^2 + y^2 = 1 + d x^2 y^2 over
//! GF(2^255 - 19), in extended coordinates (X:Y:Z:T) with x = X/Z,
//! y = Y/Z and xy = T/Z.

use std::sync::OnceLock;

use super::field::FieldElement;

/// Affine x-coordinate of the standard base point, little-endian.
const BASEPOINT_X: [u8; 32] = [
    0x1a, 0xd5, 0x25, 0x8f, 0x60, 0x2d, 0x56, 0xc9, 0xb2, 0xa7, 0x25, 0x95, 0x60, 0xc7, 0x2c, 0x69,
    0x5c, 0xdc, 0xd6, 0xfd, 0x31, 0xe2, 0xa4, 0xc0, 0xfe, 0x53, 0x6e, 0xcd, 0xd3, 0x36, 0x69, 0x21,
];

/// Affine y-coordinate of the standard base point (4/5), little-endian.
const BASEPOINT_Y: [u8; 32] = [
    0x58, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
];

/// Number of 4-bit windows in a 256-bit scalar.
const WINDOWS: usize = 64;

/// Curve constants derived once from their defining rationals.
struct CurveConstants {
    /// d = -121665 / 121666
    d: FieldElement,
    /// 2d, used by the addition formula
    d2: FieldElement,
    /// The base point B
    base: EdwardsPoint,
    /// `base_table[pos][digit] = digit * 16^pos * B`, in affine form
    base_table: Box<[[AffinePoint; 16]; WINDOWS]>,
}

fn constants() -> &'static CurveConstants {
    static CONSTANTS: OnceLock<CurveConstants> = OnceLock::new();
    CONSTANTS.get_or_init(|| {
        let d = -(FieldElement::from_u64(121_665) * FieldElement::from_u64(121_666).invert());
        let d2 = d + d;

        let x = FieldElement::from_bytes(&BASEPOINT_X);
        let y = FieldElement::from_bytes(&BASEPOINT_Y);
        let base = EdwardsPoint {
            x,
            y,
            z: FieldElement::ONE,
            t: x * y,
        };

        let mut base_table = Box::new([[AffinePoint::IDENTITY; 16]; WINDOWS]);
        let mut row_base = base;
        for row in base_table.iter_mut() {
            let mut multiple = EdwardsPoint::identity();
            for entry in row.iter_mut().skip(1) {
                multiple = add_with(&multiple, &row_base, &d2);
                *entry = AffinePoint::from_extended(&multiple, &d2);
            }
            row_base = row_base.double().double().double().double();
        }

        CurveConstants {
            d,
            d2,
            base,
            base_table,
        }
    })
}

/// Unified addition (add-2008-hwcd-3). Complete for this curve, so it is
/// also valid when `p == q` or either input is the identity.
#[inline]
fn add_with(p: &EdwardsPoint, q: &EdwardsPoint, d2: &FieldElement) -> EdwardsPoint {
    let a = (p.y - p.x) * (q.y - q.x);
    let b = (p.y + p.x) * (q.y + q.x);
    let c = p.t * *d2 * q.t;
    let zz = p.z * q.z;
    let d = zz + zz;

    let e = b - a;
    let f = d - c;
    let g = d + c;
    let h = b + a;

    EdwardsPoint {
        x: e * f,
        y: g * h,
        z: f * g,
        t: e * h,
    }
}

/// A table entry with Z = 1, stored as (y + x, y - x, 2dxy).
#[derive(Clone, Copy, Debug)]
struct AffinePoint {
    y_plus_x: FieldElement,
    y_minus_x: FieldElement,
    xy2d: FieldElement,
}

impl AffinePoint {
    const IDENTITY: Self = Self {
        y_plus_x: FieldElement::ONE,
        y_minus_x: FieldElement::ONE,
        xy2d: FieldElement::ZERO,
    };

    fn from_extended(p: &EdwardsPoint, d2: &FieldElement) -> Self {
        let zinv = p.z.invert();
        let x = p.x * zinv;
        let y = p.y * zinv;
        Self {
            y_plus_x: y + x,
            y_minus_x: y - x,
            xy2d: x * y * *d2,
        }
    }

    fn conditional_assign(&mut self, other: &Self, choice: bool) {
        self.y_plus_x.conditional_assign(&other.y_plus_x, choice);
        self.y_minus_x.conditional_assign(&other.y_minus_x, choice);
        self.xy2d.conditional_assign(&other.xy2d, choice);
    }
}

/// Mixed addition (madd-2008-hwcd-3) of an extended point and a table entry.
#[inline]
fn add_affine(p: &EdwardsPoint, q: &AffinePoint) -> EdwardsPoint {
    let a = (p.y - p.x) * q.y_minus_x;
    let b = (p.y + p.x) * q.y_plus_x;
    let c = p.t * q.xy2d;
    let d = p.z + p.z;

    let e = b - a;
    let f = d - c;
    let g = d + c;
    let h = b + a;

    EdwardsPoint {
        x: e * f,
        y: g * h,
        z: f * g,
        t: e * h,
    }
}

/// Returns `row[index]` by scanning every entry.
#[inline]
fn select(row: &[AffinePoint; 16], index: u8) -> AffinePoint {
    let mut out = AffinePoint::IDENTITY;
    for (j, entry) in row.iter().enumerate() {
        out.conditional_assign(entry, j as u8 == index);
    }
    out
}

/// A curve point in extended coordinates.
#[derive(Clone, Copy, Debug)]
pub struct EdwardsPoint {
    x: FieldElement,
    y: FieldElement,
    z: FieldElement,
    t: FieldElement,
}

impl EdwardsPoint {
    /// The neutral element (0, 1).
    pub const fn identity() -> Self {
        Self {
            x: FieldElement::ZERO,
            y: FieldElement::ONE,
            z: FieldElement::ONE,
            t: FieldElement::ZERO,
        }
    }

    /// The standard Ed25519 base point B.
    pub fn basepoint() -> Self {
        constants().base
    }

    /// The curve constant d.
    pub fn curve_d() -> FieldElement {
        constants().d
    }

    /// Returns `self + other`.
    pub fn add(&self, other: &Self) -> Self {
        add_with(self, other, &constants().d2)
    }

    /// Returns `2 * self` (dbl-2008-hwcd with a = -1).
    pub fn double(&self) -> Self {
        let a = self.x.square();
        let b = self.y.square();
        let zz = self.z.square();
        let c = zz + zz;
        let d = -a;
        let e = (self.x + self.y).square() - a - b;
        let g = d + b;
        let f = g - c;
        let h = d - b;

        Self {
            x: e * f,
            y: g * h,
            z: f * g,
            t: e * h,
        }
    }

    /// Returns true if the affine coordinates satisfy the curve equation.
    pub fn is_on_curve(&self) -> bool {
        let zinv = self.z.invert();
        let x = self.x * zinv;
        let y = self.y * zinv;
        let xx = x.square();
        let yy = y.square();
        yy - xx == FieldElement::ONE + constants().d * xx * yy
    }

    /// Encodes the point as 32 bytes: the canonical y-coordinate with the
    /// parity of x stored in the top bit.
    pub fn compress(&self) -> [u8; 32] {
        let zinv = self.z.invert();
        let x = self.x * zinv;
        let y = self.y * zinv;

        let mut out = y.to_bytes();
        out[31] ^= (x.is_negative() as u8) << 7;
        out
    }

    /// Multiplies the base point by a little-endian 256-bit scalar.
    ///
    /// The scalar is read as 64 radix-16 digits. Digit `pos` selects
    /// `digit * 16^pos * B` from the precomputed table, so the product is
    /// 64 mixed additions and no doublings. Each lookup reads all sixteen
    /// entries of its row, so the sequence of field operations does not
    /// depend on the scalar.
    pub fn mul_base(scalar: &[u8; 32]) -> Self {
        let table = &constants().base_table;
        let mut acc = Self::identity();

        for (pos, row) in table.iter().enumerate() {
            let digit = (scalar[pos / 2] >> ((pos % 2) * 4)) & 0x0f;
            acc = add_affine(&acc, &select(row, digit));
        }

        acc
    }
}

impl PartialEq for EdwardsPoint {
    /// Projective equality: X1*Z2 == X2*Z1 and Y1*Z2 == Y2*Z1.
    fn eq(&self, other: &Self) -> bool {
        self.x * other.z == other.x * self.z && self.y * other.z == other.y * self.z
    }
}

impl Eq for EdwardsPoint {}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_from_u64(n: u64) -> [u8; 32] {
        let mut s = [0u8; 32];
        s[..8].copy_from_slice(&n.to_le_bytes());
        s
    }

    /// Double-and-add over every bit, independent of the table.
    fn mul_by_doubling(scalar: &[u8; 32]) -> EdwardsPoint {
        let b = EdwardsPoint::basepoint();
        let mut acc = EdwardsPoint::identity();
        for i in (0..256).rev() {
            acc = acc.double();
            if (scalar[i / 8] >> (i % 8)) & 1 == 1 {
                acc = acc.add(&b);
            }
        }
        acc
    }

    #[test]
    fn test_curve_d() {
        assert_eq!(
            hex::encode(EdwardsPoint::curve_d().to_bytes()),
            "a3785913ca4deb75abd841414d0a700098e879777940c78c73fe6f2bee6c0352"
        );
    }

    #[test]
    fn test_basepoint_on_curve() {
        assert!(EdwardsPoint::basepoint().is_on_curve());
        assert!(EdwardsPoint::identity().is_on_curve());
    }

    #[test]
    fn test_basepoint_compression() {
        assert_eq!(
            hex::encode(EdwardsPoint::basepoint().compress()),
            "5866666666666666666666666666666666666666666666666666666666666666"
        );
    }

    #[test]
    fn test_double_matches_add() {
        let b = EdwardsPoint::basepoint();
        assert_eq!(b.double(), b.add(&b));
        let b3 = b.double().add(&b);
        assert_eq!(b3.double(), b3.add(&b3));
        assert!(b3.double().is_on_curve());
    }

    #[test]
    fn test_identity_is_neutral() {
        let b = EdwardsPoint::basepoint();
        assert_eq!(b.add(&EdwardsPoint::identity()), b);
        assert_eq!(EdwardsPoint::identity().double(), EdwardsPoint::identity());
    }

    #[test]
    fn test_mul_base_small_scalars() {
        let b = EdwardsPoint::basepoint();
        assert_eq!(EdwardsPoint::mul_base(&scalar_from_u64(0)), EdwardsPoint::identity());
        assert_eq!(EdwardsPoint::mul_base(&scalar_from_u64(1)), b);

        let mut expected = EdwardsPoint::identity();
        for n in 1..=40u64 {
            expected = expected.add(&b);
            assert_eq!(EdwardsPoint::mul_base(&scalar_from_u64(n)), expected, "n = {}", n);
        }
    }

    #[test]
    fn test_mul_base_matches_double_and_add() {
        let scalars = [
            scalar_from_u64(16),
            scalar_from_u64(0x1_0000),
            scalar_from_u64(u64::MAX),
            [0xff; 32],
            {
                let mut s = [0u8; 32];
                s[31] = 0x40;
                s
            },
            {
                let mut s = [0u8; 32];
                for (i, byte) in s.iter_mut().enumerate() {
                    *byte = (i as u8).wrapping_mul(37).wrapping_add(11);
                }
                s
            },
        ];

        for scalar in &scalars {
            let expected = mul_by_doubling(scalar);
            let actual = EdwardsPoint::mul_base(scalar);
            assert_eq!(actual, expected, "scalar = {}", hex::encode(scalar));
            assert!(actual.is_on_curve());
        }
    }

    #[test]
    fn test_mul_base_sixteen_is_next_window() {
        // 16 * B comes from the second table row, not from row zero.
        let b = EdwardsPoint::basepoint();
        let mut expected = EdwardsPoint::identity();
        for _ in 0..16 {
            expected = expected.add(&b);
        }
        assert_eq!(EdwardsPoint::mul_base(&scalar_from_u64(16)), expected);
        assert_eq!(
            EdwardsPoint::mul_base(&scalar_from_u64(17)),
            expected.add(&b)
        );
    }

    #[test]
    fn test_mul_base_is_homomorphic() {
        // (a + b) * B == a * B + b * B for scalars spanning several windows.
        let a = 0x0123_4567_89ab_cdefu64;
        let b = 0x0fed_cba9_8765_4321u64;
        let lhs = EdwardsPoint::mul_base(&scalar_from_u64(a + b));
        let rhs = EdwardsPoint::mul_base(&scalar_from_u64(a)).add(&EdwardsPoint::mul_base(&scalar_from_u64(b)));
        assert_eq!(lhs, rhs);
    }
}
