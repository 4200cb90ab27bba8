//! Pairwise transform of two concurrent operations.
//!
//! Given `a` and `b` generated against the same base text, [`transform`]
//! returns `(a', b')` such that applying `a` then `b'` gives the same text
//! as applying `b` then `a'`.
//!
//! Two tie-breaks are fixed policy and must not drift, since callers may
//! depend on the resulting order:
//!
//! - Two inserts at the same position: `a` lands first and `b` is shifted
//!   past it. A site id would be a better secondary key, but operations do
//!   not carry one.
//! - An insert strictly inside a concurrently deleted range: the delete
//!   grows to cover the inserted text and the insert is clamped to the
//!   start of the range. What the clamped insert becomes is decided by
//!   [`ContestedInsert`].
//!
//! Retains pass through untouched. Formatting-aware retain transforms are
//! not modelled.

use crate::config::ContestedInsert;
use crate::ot::op::MAX_POSITION;
use crate::ot::op::OpKind;
use crate::ot::op::Operation;

/// Transform two concurrent operations with the default contested-insert
/// policy.
pub fn transform(a: &Operation, b: &Operation) -> (Operation, Operation) {
    return transform_with(a, b, ContestedInsert::default());
}

/// Transform two concurrent operations.
pub fn transform_with(a: &Operation, b: &Operation, policy: ContestedInsert) -> (Operation, Operation) {
    return match (&a.kind, &b.kind) {
        (OpKind::Retain, _) | (_, OpKind::Retain) => (a.clone(), b.clone()),
        (OpKind::Insert { .. }, OpKind::Insert { .. }) => insert_insert(a, b),
        (OpKind::Insert { .. }, OpKind::Delete { .. }) => insert_delete(a, b, policy),
        (OpKind::Delete { .. }, OpKind::Insert { .. }) => {
            let (b_prime, a_prime) = insert_delete(b, a, policy);
            (a_prime, b_prime)
        }
        (OpKind::Delete { .. }, OpKind::Delete { .. }) => delete_delete(a, b),
    };
}

fn shift_right(position: u64, by: u64) -> u64 {
    return position.saturating_add(by).min(MAX_POSITION);
}

fn insert_insert(a: &Operation, b: &Operation) -> (Operation, Operation) {
    if b.position < a.position {
        return (a.moved_to(shift_right(a.position, b.extent())), b.clone());
    }
    // Equal positions fall here too: `a` keeps its place.
    return (a.clone(), b.moved_to(shift_right(b.position, a.extent())));
}

fn insert_delete(ins: &Operation, del: &Operation, policy: ContestedInsert) -> (Operation, Operation) {
    let point = ins.position;
    let start = del.position;
    let length = del.extent();
    let end = start + length;

    if point < start {
        return (ins.clone(), del.moved_to(shift_right(start, ins.extent())));
    }
    if point >= end {
        return (ins.moved_to(point - length), del.clone());
    }

    // `start` is at most MAX_POSITION, so the cap cannot underflow.
    let grown = del.resized(start, length.saturating_add(ins.extent()).min(MAX_POSITION - start));
    let clamped = match policy {
        ContestedInsert::Absorb => ins.absorbed_at(start),
        ContestedInsert::Clamp => ins.moved_to(start),
    };
    return (clamped, grown);
}

fn delete_delete(a: &Operation, b: &Operation) -> (Operation, Operation) {
    let (a_start, a_len) = (a.position, a.extent());
    let (b_start, b_len) = (b.position, b.extent());
    let a_end = a_start + a_len;
    let b_end = b_start + b_len;

    if a_end <= b_start {
        return (a.clone(), b.moved_to(b_start - a_len));
    }
    if b_end <= a_start {
        return (a.moved_to(a_start - b_len), b.clone());
    }

    // Both sides already removed the overlap, so neither deletes it again.
    let overlap = a_end.min(b_end).saturating_sub(a_start.max(b_start));
    let start = a_start.min(b_start);
    return (a.resized(start, a_len - overlap), b.resized(start, b_len - overlap));
}
