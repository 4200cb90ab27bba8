//! Operational transform over a single linear text buffer.
//!
//! The pieces build on each other in this order:
//!
//! 1. [`op`]: the operation model.
//! 2. [`transform`]: the pairwise transform of two concurrent operations.
//! 3. [`conflict`]: overlap detection and priority resolution.
//! 4. [`converge`]: folding a batch into one sequence.
//! 5. [`compact`]: merging adjacent operations in a log.
//!
//! Everything here is pure and synchronous. Operations are values, and no
//! function keeps state between calls.

pub mod compact;
pub mod conflict;
pub mod converge;
pub mod op;
pub mod transform;

pub use compact::merge;
pub use conflict::conflicting_pairs;
pub use conflict::conflicts;
pub use conflict::resolve;
pub use converge::converge;
pub use converge::linearize;
pub use op::Attributes;
pub use op::OpKind;
pub use op::Operation;
pub use transform::transform;
