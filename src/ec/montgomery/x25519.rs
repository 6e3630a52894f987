use subtle::Choice;

use super::LadderField;
use crate::ec::field25519::FieldElement;

impl LadderField for FieldElement {
    const ZERO: Self = FieldElement::ZERO;
    const ONE: Self = FieldElement::ONE;
    const A24: u32 = 121665;
    const BITS: usize = 255;

    fn square(&self) -> Self {
        FieldElement::square(self)
    }

    fn mul_small(&self, k: u32) -> Self {
        FieldElement::mul_small(self, k as i32)
    }

    fn invert(&self) -> Self {
        FieldElement::invert(self)
    }

    fn conditional_swap(a: &mut Self, b: &mut Self, choice: Choice) {
        FieldElement::conditional_swap(a, b, choice)
    }
}

/// X25519 on already fixed inputs. `u` is read as a field element, so a
/// value in `[p, 2^255)` is reduced.
pub(super) fn x25519(scalar: &[u8; 32], u: &[u8; 32]) -> [u8; 32] {
    super::ladder(scalar, FieldElement::from_bytes(u)).to_bytes()
}
