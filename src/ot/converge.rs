//! Folding a batch of concurrent operations into one sequence.
//!
//! Both functions here sort by version (stably, so equal versions keep
//! their input order) and then fold the pairwise transform over the batch.
//! That costs O(n²) transforms for n operations. It suits the batches a
//! single editing session produces, not a long persisted history; compact
//! such a log with [`crate::ot::compact::merge`] first.

use tracing::debug;
use tracing::trace;

use crate::config::ContestedInsert;
use crate::ot::op::Operation;
use crate::ot::transform::transform_with;

fn by_version(ops: &[Operation]) -> Vec<Operation> {
    let mut sorted = ops.to_vec();
    sorted.sort_by_key(|op| op.version);
    return sorted;
}

/// Converge a batch with the default contested-insert policy.
pub fn converge(ops: &[Operation]) -> Vec<Operation> {
    return converge_with(ops, ContestedInsert::default());
}

/// Converge a batch.
///
/// Each operation, in version order, is transformed against every
/// operation already in the result. The arriving operation picks up the
/// shifts of everything before it, and each earlier entry is rewritten in
/// place to account for the arrival. Every entry therefore ends up rebased
/// over every other operation in the batch.
///
/// The entries are not a serial edit script for the base text; use
/// [`linearize`] for that.
pub fn converge_with(ops: &[Operation], policy: ContestedInsert) -> Vec<Operation> {
    let mut done: Vec<Operation> = Vec::with_capacity(ops.len());

    for op in by_version(ops) {
        let mut incoming = op;
        for existing in done.iter_mut() {
            let (existing_prime, incoming_prime) = transform_with(existing, &incoming, policy);
            trace!(
                existing = ?existing_prime,
                incoming = ?incoming_prime,
                "converge step"
            );
            *existing = existing_prime;
            incoming = incoming_prime;
        }
        done.push(incoming);
    }

    debug!(ops = done.len(), "converged batch");
    return done;
}

/// Linearize a batch with the default contested-insert policy.
pub fn linearize(ops: &[Operation]) -> Vec<Operation> {
    return linearize_with(ops, ContestedInsert::default());
}

/// Turn a batch of operations made against the same base text into an
/// edit script for that text.
///
/// Each operation, in version order, is rebased over the operations
/// already in the script, which are left as they are. Applying the result
/// in order to the base text applies every operation once. For two
/// operations this is `[a, transform(a, b).1]`.
pub fn linearize_with(ops: &[Operation], policy: ContestedInsert) -> Vec<Operation> {
    let mut script: Vec<Operation> = Vec::with_capacity(ops.len());

    for op in by_version(ops) {
        let mut incoming = op;
        for applied in &script {
            incoming = transform_with(applied, &incoming, policy).1;
        }
        trace!(op = ?incoming, "linearized");
        script.push(incoming);
    }

    debug!(ops = script.len(), "linearized batch");
    return script;
}
