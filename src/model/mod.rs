mod predictor;

pub use predictor::{build_predictor, MotionPredictor, ScriptedPredictor, ZeroVelocity};

use crate::common::*;

/// Selects how predictions are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictorKind {
    /// a pretrained TorchScript module
    Scripted,
    /// repeat the last observed frame
    ZeroVelocity,
}
