//! The six additive update rules and their tunable constants.

use serde::{Deserialize, Serialize};
use statik_types::Stage;

/// The update rule a cell applies, selected by its stage label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateRule {
    /// Stage 0: a fresh uniform draw.
    Fresh,
    /// Stage 1: a fixed increment.
    Constant,
    /// Stage 2: decay proportional to the value.
    LinearDecay,
    /// Stage 3: the random buffer, cycling over a full line.
    LineBuffer,
    /// Stage 4: the random buffer, cycling over one less than a line and
    /// zeroing the cell whenever the cursor wraps.
    ShortBuffer,
    /// Stage 5: decay proportional to the square of the value.
    SquareDecay,
}

impl From<Stage> for UpdateRule {
    fn from(stage: Stage) -> Self {
        match stage.value() {
            0 => Self::Fresh,
            1 => Self::Constant,
            2 => Self::LinearDecay,
            3 => Self::LineBuffer,
            4 => Self::ShortBuffer,
            // Stage values stop at MAX_STAGE - 1 == 5.
            _ => Self::SquareDecay,
        }
    }
}

/// Constants shared by the update rules, the stage gate and the freeze
/// gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleParams {
    /// Factor applied to every increment before it is added.
    #[serde(default = "default_damping")]
    pub damping: f64,

    /// Increment used by [`UpdateRule::Constant`].
    #[serde(default = "default_constant_increment")]
    pub constant_increment: f64,

    /// Decay factor for [`UpdateRule::LinearDecay`].
    #[serde(default = "default_decay")]
    pub linear_decay: f64,

    /// Decay factor for [`UpdateRule::SquareDecay`].
    #[serde(default = "default_decay")]
    pub square_decay: f64,

    /// A cell adopts the global stage only while its fractional value is
    /// below this threshold.
    #[serde(default = "default_adoption_threshold")]
    pub adoption_threshold: f64,

    /// A near-frozen cell freezes once its fractional value is below this
    /// threshold.
    #[serde(default = "default_freeze_threshold")]
    pub freeze_threshold: f64,
}

impl Default for RuleParams {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            constant_increment: default_constant_increment(),
            linear_decay: default_decay(),
            square_decay: default_decay(),
            adoption_threshold: default_adoption_threshold(),
            freeze_threshold: default_freeze_threshold(),
        }
    }
}

const fn default_damping() -> f64 {
    0.05
}

const fn default_constant_increment() -> f64 {
    0.08
}

const fn default_decay() -> f64 {
    0.05
}

const fn default_adoption_threshold() -> f64 {
    0.5
}

const fn default_freeze_threshold() -> f64 {
    0.1
}
