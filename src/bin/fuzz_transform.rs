//! AFL fuzz harness for the transform engine
//!
//! This harness checks, for a base text and a batch of operations made
//! against it:
//! 1. Convergence: every adjacent pair transforms into a converging pair
//! 2. Linearization: the linearized batch applies to the base text
//! 3. Compaction: merging the script is idempotent and keeps its effect

use afl::fuzz;
use tandem::buffer::{apply, apply_all};
use tandem::ot::{linearize, merge, transform, Operation};

/// Operation types the fuzzer can generate
#[derive(Debug, Clone, Copy)]
enum FuzzOp {
    Insert { pos_frac: u8, len: u8, version: u8 },
    Delete { pos_frac: u8, len: u8, version: u8 },
    Retain { pos_frac: u8, version: u8 },
}

impl FuzzOp {
    fn from_bytes(bytes: &[u8]) -> Option<(FuzzOp, &[u8])> {
        if bytes.len() < 4 {
            return None;
        }
        let rest = &bytes[4..];
        let op = match bytes[0] % 3 {
            0 => FuzzOp::Insert {
                pos_frac: bytes[1],
                len: (bytes[2] % 16).saturating_add(1), // 1-16 chars
                version: bytes[3],
            },
            1 => FuzzOp::Delete { pos_frac: bytes[1], len: bytes[2] % 32, version: bytes[3] },
            _ => FuzzOp::Retain { pos_frac: bytes[1], version: bytes[3] },
        };
        Some((op, rest))
    }

    fn build(self, base_len: u64) -> Operation {
        let at = |frac: u8| (frac as u64) * (base_len + 1) / 256;
        match self {
            FuzzOp::Insert { pos_frac, len, version } => {
                let content: String = (0..len).map(|i| (b'A' + i % 26) as char).collect();
                Operation::insert(at(pos_frac), content, version as u64).unwrap()
            }
            FuzzOp::Delete { pos_frac, len, version } => {
                let position = at(pos_frac);
                let length = (len as u64).min(base_len - position);
                Operation::delete(position, length, version as u64).unwrap()
            }
            FuzzOp::Retain { pos_frac, version } => {
                Operation::retain(at(pos_frac), version as u64).unwrap()
            }
        }
    }
}

fn main() {
    fuzz!(|data: &[u8]| {
        let Some((&base_len, mut remaining)) = data.split_first() else {
            return;
        };
        let base: String = (0..base_len).map(|i| (b'a' + i % 26) as char).collect();

        let mut ops = Vec::new();
        while let Some((op, rest)) = FuzzOp::from_bytes(remaining) {
            remaining = rest;
            ops.push(op.build(base_len as u64));
        }

        // CRITICAL INVARIANT: every pair converges
        for pair in ops.windows(2) {
            let (a_prime, b_prime) = transform(&pair[0], &pair[1]);
            let mut left = base.clone();
            apply(&mut left, &pair[0]).unwrap();
            apply(&mut left, &b_prime).unwrap();
            let mut right = base.clone();
            apply(&mut right, &pair[1]).unwrap();
            apply(&mut right, &a_prime).unwrap();
            assert_eq!(left, right, "Convergence failure for {:?}", pair);
        }

        let script = linearize(&ops);
        let mut expected = base.clone();
        apply_all(&mut expected, &script).expect("linearized batch out of bounds");

        let merged = merge(&script);
        assert_eq!(merge(&merged), merged, "Merge is not idempotent");
        let mut actual = base.clone();
        apply_all(&mut actual, &merged).expect("merged script out of bounds");
        assert_eq!(actual, expected, "Merge changed the result");
    });
}
