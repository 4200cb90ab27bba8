//! Engine configuration.

use serde::Deserialize;
use serde::Serialize;

use crate::error::OtError;
use crate::error::Result;

/// What happens to an insert that lands strictly inside a range a
/// concurrent delete removes.
///
/// In both policies the delete grows to cover the inserted text and the
/// insert is clamped to the start of the deleted range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContestedInsert {
    /// The clamped insert becomes a retain, so the deleted region wins on
    /// both sides and the pair converges.
    #[default]
    Absorb,
    /// The clamped insert stays an insert. The side that applied the
    /// delete first keeps the inserted text, the other side loses it.
    Clamp,
}

/// Tunables for [`crate::engine::Engine`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub contested_insert: ContestedInsert,
    /// Convergence is quadratic in the batch size; batches larger than
    /// this are logged as a warning.
    pub large_batch_warning: usize,
    /// Run the merge pass over a linearized batch before applying it.
    pub compact_before_apply: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        return EngineConfig {
            contested_insert: ContestedInsert::Absorb,
            large_batch_warning: 256,
            compact_before_apply: false,
        };
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<EngineConfig> {
        return serde_json::from_str(json).map_err(OtError::Config);
    }
}
