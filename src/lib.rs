//! Tandem - an operational transform engine for concurrent text edits.
//!
//! Two people edit the same text at once. Each edit is an [`Operation`]
//! made against the same base version. Transforming the pair gives each
//! side a rebased copy of the other's edit, and both end up with the same
//! text.
//!
//! # Quick Start
//!
//! ```
//! use tandem::buffer::apply;
//! use tandem::ot::{Operation, transform};
//!
//! let base = "hello world";
//! let a = Operation::insert(5, ",", 1).unwrap();
//! let b = Operation::delete(6, 5, 1).unwrap();
//! let (a_prime, b_prime) = transform(&a, &b);
//!
//! let mut left = base.to_string();
//! apply(&mut left, &a).unwrap();
//! apply(&mut left, &b_prime).unwrap();
//!
//! let mut right = base.to_string();
//! apply(&mut right, &b).unwrap();
//! apply(&mut right, &a_prime).unwrap();
//!
//! assert_eq!(left, "hello, ");
//! assert_eq!(left, right);
//! ```

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod ot;

pub use config::ContestedInsert;
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::OtError;
pub use ot::Operation;
