use serde::{Deserialize, Serialize};

use super::roller::{DiceSource, RollProof};

/// Most dice a single throw may ask for
pub const MAX_DICE_PER_ROLL: u32 = 10;

#[derive(Debug, Default, Deserialize)]
pub struct RollRequest {
    /// Omit for a non-reproducible roll
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RollResponse {
    pub source: DiceSource,
    pub values: Vec<u8>,
    pub total: u32,
    /// One proof per die; empty for unseeded rolls
    pub proofs: Vec<RollProof>,
}
