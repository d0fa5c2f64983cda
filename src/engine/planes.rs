//! Bit-sliced counter arithmetic for the multi-spin engine.
//!
//! A set of digit planes holds one small unsigned counter per bit lane:
//! plane `d` carries bit `d` of every lane's counter. Mismatch masks are
//! accumulated with half/full-adder identities and compared against scalar
//! tier bounds without any per-lane branching.

/// Number of digit planes; counters stay below `2^MAX_PLANES`.
///
/// The weighted mismatch magnitude of a site is at most
/// `MAX_NEIGHBORS * 3 = 18`, so five planes suffice; one spare plane absorbs
/// transient carries.
pub const MAX_PLANES: usize = 6;

/// Per-lane counters held as bit planes, all starting at zero.
pub type DigitPlanes = [u64; MAX_PLANES];

/// Add `2^shift` to every lane whose bit is set in `mask`.
///
/// Ripple-carry over the planes: `sum = plane ^ carry`,
/// `carry_out = plane & carry`. The loop dies as soon as the carry word is
/// empty, which for sparse masks is almost immediately.
#[inline]
pub fn add_bits(planes: &mut DigitPlanes, mask: u64, shift: usize) {
    let mut carry = mask;
    let mut d = shift;
    while carry != 0 {
        let sum = planes[d] ^ carry;
        carry &= planes[d];
        planes[d] = sum;
        d += 1;
    }
}

/// Per-lane `counter >= bound`, as a bit mask.
///
/// Evaluates the borrow chain of `counter - bound` across all planes; a lane
/// ends with no borrow exactly when its counter is at least `bound`.
/// `bound = 0` yields the all-ones mask.
#[inline]
pub fn ge_mask(planes: &DigitPlanes, bound: u32) -> u64 {
    debug_assert!(bound < (1 << MAX_PLANES));
    let mut borrow = 0u64;
    for (d, &plane) in planes.iter().enumerate() {
        let b = if (bound >> d) & 1 == 1 { !0u64 } else { 0 };
        borrow = (!plane & b) | ((!plane | b) & borrow);
    }
    !borrow
}
