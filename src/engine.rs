//! A configured entry point for a document service.
//!
//! [`Engine`] bundles an [`EngineConfig`] with the free functions in
//! [`crate::ot`], so a service can set the contested-insert policy and the
//! batch size warning once and apply incoming batches to its buffers.

use tracing::debug;
use tracing::warn;

use crate::buffer::TextBuffer;
use crate::buffer::apply_all;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::ot::compact;
use crate::ot::conflict;
use crate::ot::converge;
use crate::ot::op::Operation;
use crate::ot::transform;

/// The transform engine. Holds no state besides its configuration, so one
/// engine can serve any number of concurrent batches.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Engine {
        return Engine { config };
    }

    pub fn config(&self) -> &EngineConfig {
        return &self.config;
    }

    /// See [`transform::transform`].
    pub fn transform(&self, a: &Operation, b: &Operation) -> (Operation, Operation) {
        return transform::transform_with(a, b, self.config.contested_insert);
    }

    /// See [`conflict::conflicts`].
    pub fn conflicts(&self, a: &Operation, b: &Operation) -> bool {
        return conflict::conflicts(a, b);
    }

    /// See [`conflict::resolve`].
    pub fn resolve<P: Ord>(&self, a: &Operation, b: &Operation, priority_a: P, priority_b: P) -> Operation {
        return conflict::resolve(a, b, priority_a, priority_b);
    }

    /// See [`converge::converge`].
    pub fn converge(&self, ops: &[Operation]) -> Vec<Operation> {
        self.check_batch_size(ops.len());
        return converge::converge_with(ops, self.config.contested_insert);
    }

    /// See [`converge::linearize`].
    pub fn linearize(&self, ops: &[Operation]) -> Vec<Operation> {
        self.check_batch_size(ops.len());
        return converge::linearize_with(ops, self.config.contested_insert);
    }

    /// See [`compact::merge`].
    pub fn merge(&self, ops: &[Operation]) -> Vec<Operation> {
        return compact::merge(ops);
    }

    /// Apply a batch of concurrent operations, all made against the current
    /// contents of `buffer`.
    ///
    /// The batch is linearized, merged if configured, and applied in order.
    /// On error the buffer keeps the operations applied before the failing
    /// one.
    pub fn apply_batch<B: TextBuffer + ?Sized>(&self, buffer: &mut B, ops: &[Operation]) -> Result<()> {
        let mut script = self.linearize(ops);
        if self.config.compact_before_apply {
            script = compact::merge(&script);
        }
        debug!(batch = ops.len(), script = script.len(), "applying batch");
        return apply_all(buffer, &script);
    }

    fn check_batch_size(&self, len: usize) {
        if len > self.config.large_batch_warning {
            warn!(
                batch = len,
                limit = self.config.large_batch_warning,
                "large batch: convergence is quadratic in batch size, compact the log first"
            );
        }
    }
}
