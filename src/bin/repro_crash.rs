//! Reproduce AFL crashes without AFL instrumentation
//!
//! Usage: cargo run --bin repro_crash -- <crash_file>

use std::fs;
use tandem::buffer::{apply, apply_all};
use tandem::ot::{linearize, merge, transform, Operation};

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
                len: (bytes[2] % 16).saturating_add(1),
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
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <crash_file>", args[0]);
        std::process::exit(1);
    }

    let data = fs::read(&args[1]).expect("Failed to read crash file");
    println!("Crash file size: {} bytes", data.len());

    let Some((&base_len, mut remaining)) = data.split_first() else {
        println!("Empty input");
        return;
    };
    let base: String = (0..base_len).map(|i| (b'a' + i % 26) as char).collect();
    println!("Base text: {:?}", base);

    let mut ops = Vec::new();
    while let Some((op, rest)) = FuzzOp::from_bytes(remaining) {
        remaining = rest;
        let built = op.build(base_len as u64);
        println!("  {:?} -> {:?}", op, built);
        ops.push(built);
    }

    for (i, pair) in ops.windows(2).enumerate() {
        let (a_prime, b_prime) = transform(&pair[0], &pair[1]);
        let mut left = base.clone();
        apply(&mut left, &pair[0]).unwrap();
        apply(&mut left, &b_prime).unwrap();
        let mut right = base.clone();
        apply(&mut right, &pair[1]).unwrap();
        apply(&mut right, &a_prime).unwrap();
        if left != right {
            println!("Convergence failure at pair {}: {:?} != {:?}", i, left, right);
            return;
        }
    }

    let script = linearize(&ops);
    let mut expected = base.clone();
    if let Err(err) = apply_all(&mut expected, &script) {
        println!("Linearized batch failed: {}", err);
        return;
    }

    let merged = merge(&script);
    let mut actual = base.clone();
    if let Err(err) = apply_all(&mut actual, &merged) {
        println!("Merged script failed: {}", err);
        return;
    }
    if actual != expected || merge(&merged) != merged {
        println!("Merge mismatch: {:?} vs {:?}", actual, expected);
        return;
    }

    println!("No failure reproduced, final text {:?}", expected);
}
