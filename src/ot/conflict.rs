//! Conflict detection and priority-based resolution.
//!
//! An insert claims the zero-width point at its position, a delete claims
//! `[position, position + length)`, and a retain claims nothing. Two
//! operations conflict when their claims overlap.

use crate::config::ContestedInsert;
use crate::ot::op::OpKind;
use crate::ot::op::Operation;
use crate::ot::transform::transform_with;

/// The half-open range an operation claims, or `None` for a retain.
fn claim(op: &Operation) -> Option<(u64, u64)> {
    return match &op.kind {
        OpKind::Insert { .. } => Some((op.position, op.position)),
        OpKind::Delete { length } => Some((op.position, op.position + length)),
        OpKind::Retain => None,
    };
}

/// Whether the ranges claimed by `a` and `b` overlap. Symmetric.
pub fn conflicts(a: &Operation, b: &Operation) -> bool {
    let (Some((a_start, a_end)), Some((b_start, b_end))) = (claim(a), claim(b)) else {
        return false;
    };
    return !(a_end <= b_start || b_end <= a_start);
}

/// Index pairs `(i, j)` with `i < j` of every conflicting pair in `ops`.
pub fn conflicting_pairs(ops: &[Operation]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, a) in ops.iter().enumerate() {
        for (j, b) in ops.iter().enumerate().skip(i + 1) {
            if conflicts(a, b) {
                pairs.push((i, j));
            }
        }
    }
    return pairs;
}

/// Pick one operation out of a concurrent pair.
///
/// Without a conflict this is the transformed `a` from the pairwise
/// transform, whatever the priorities. Callers consuming `b`'s side get
/// nothing here and must transform themselves.
///
/// The only non-conflicting pair that reaches the contested-insert case is
/// an insert exactly at a delete's start. There the insert comes back as an
/// insert clamped to that start, under every [`ContestedInsert`] policy:
/// the detector saw no conflict, so nothing may win over the typed text.
///
/// With a conflict the strictly higher priority wins unchanged. Equal
/// priorities fall back to the higher version, and an exact version tie
/// goes to `a`.
pub fn resolve<P: Ord>(a: &Operation, b: &Operation, priority_a: P, priority_b: P) -> Operation {
    if !conflicts(a, b) {
        return transform_with(a, b, ContestedInsert::Clamp).0;
    }
    if priority_a > priority_b {
        return a.clone();
    }
    if priority_b > priority_a {
        return b.clone();
    }
    if a.version >= b.version {
        return a.clone();
    }
    return b.clone();
}
