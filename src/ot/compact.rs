//! Compaction of an operation log.
//!
//! Runs of adjacent operations that amount to one edit are folded into a
//! single operation: typing forwards produces inserts that each start where
//! the previous one ended, and repeated deletes at the cursor share a
//! position. Input order is kept as given; sort first if it matters.

use tracing::debug;

use crate::ot::op::MAX_POSITION;
use crate::ot::op::OpKind;
use crate::ot::op::Operation;

/// Fold `next` into `acc` if the two are one contiguous edit.
fn absorb(acc: &mut Operation, next: &Operation) -> bool {
    let acc_start = acc.position;
    let acc_end = acc_start + acc.extent();
    match (&mut acc.kind, &next.kind) {
        (OpKind::Insert { content }, OpKind::Insert { content: more }) if acc_end == next.position => {
            content.push_str(more);
        }
        (OpKind::Delete { length }, OpKind::Delete { length: more }) if acc_start == next.position => {
            *length = length.saturating_add(*more).min(MAX_POSITION - acc_start);
        }
        _ => return false,
    }
    // The first operation's attributes are kept.
    acc.version = acc.version.max(next.version);
    return true;
}

/// Merge adjacent same-kind operations.
///
/// Two inserts merge when the second starts exactly where the first one's
/// text ends; their contents are concatenated. Two deletes merge when they
/// share a position; their lengths are summed. The merged version is the
/// larger of the two. The result is never longer than the input, and
/// merging it again changes nothing.
pub fn merge(ops: &[Operation]) -> Vec<Operation> {
    let mut out: Vec<Operation> = Vec::with_capacity(ops.len());
    let mut iter = ops.iter();
    let Some(first) = iter.next() else {
        return out;
    };

    let mut acc = first.clone();
    for next in iter {
        if !absorb(&mut acc, next) {
            out.push(std::mem::replace(&mut acc, next.clone()));
        }
    }
    out.push(acc);

    debug!(before = ops.len(), after = out.len(), "merged operations");
    return out;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ot::op::Attributes;
    use serde_json::json;

    fn ins(position: u64, content: &str, version: u64) -> Operation {
        return Operation::insert(position, content, version).unwrap();
    }

    fn del(position: u64, length: u64, version: u64) -> Operation {
        return Operation::delete(position, length, version).unwrap();
    }

    #[test]
    fn empty_log() {
        assert!(merge(&[]).is_empty());
    }

    #[test]
    fn contiguous_inserts_merge() {
        assert_eq!(merge(&[ins(0, "ab", 1), ins(2, "cd", 2)]), vec![ins(0, "abcd", 2)]);
    }

    #[test]
    fn contiguity_counts_chars() {
        assert_eq!(merge(&[ins(4, "né", 0), ins(6, "e", 0)]), vec![ins(4, "née", 0)]);
    }

    #[test]
    fn gapped_inserts_stay_apart() {
        let ops = [ins(0, "ab", 0), ins(3, "cd", 0)];
        assert_eq!(merge(&ops), ops.to_vec());
    }

    #[test]
    fn deletes_at_same_position_merge() {
        let ops = [del(5, 1, 3), del(5, 1, 1), del(5, 2, 2)];
        assert_eq!(merge(&ops), vec![del(5, 4, 3)]);
    }

    #[test]
    fn merged_delete_is_capped_at_max_position() {
        let merged = merge(&[del(0, MAX_POSITION, 0), del(0, MAX_POSITION, 1)]);
        assert_eq!(merged, vec![del(0, MAX_POSITION, 1)]);

        let wire = serde_json::to_value(&merged[0]).unwrap();
        assert_eq!(wire["length"], json!(MAX_POSITION));
        assert_eq!(Operation::from_json(&wire.to_string()).unwrap(), merged[0]);
    }

    #[test]
    fn backspace_run_does_not_merge() {
        let ops = [del(5, 1, 0), del(4, 1, 0)];
        assert_eq!(merge(&ops), ops.to_vec());
    }

    #[test]
    fn kind_change_breaks_the_run() {
        let ops = [ins(0, "a", 0), ins(1, "b", 0), del(2, 1, 0), del(2, 1, 0), ins(2, "c", 0)];
        assert_eq!(merge(&ops), vec![ins(0, "ab", 0), del(2, 2, 0), ins(2, "c", 0)]);
    }

    #[test]
    fn retains_never_merge() {
        let r = Operation::retain(0, 0).unwrap();
        let ops = [r.clone(), r.clone()];
        assert_eq!(merge(&ops), vec![r.clone(), r]);
    }

    #[test]
    fn first_attributes_win() {
        let bold: Attributes = [("bold", json!(true))].into_iter().collect();
        let italic: Attributes = [("italic", json!(true))].into_iter().collect();
        let ops = [
            ins(0, "ab", 0).with_attributes(bold.clone()),
            ins(2, "cd", 0).with_attributes(italic),
        ];
        let merged = merge(&ops);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].attributes(), &bold);
    }

    #[test]
    fn merging_twice_is_a_no_op() {
        let ops = [
            ins(0, "a", 0),
            ins(1, "b", 1),
            ins(5, "c", 2),
            del(3, 1, 3),
            del(3, 1, 4),
            del(2, 1, 5),
        ];
        let once = merge(&ops);
        assert_eq!(merge(&once), once);
        assert!(once.len() <= ops.len());
    }
}
