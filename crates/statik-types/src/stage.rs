//! Update-rule stage labels.
//!
//! A [`Stage`] selects one of the six additive update rules. The same type
//! is used for the process-wide global stage (advanced on a timer) and for
//! each cell's own label, which only catches up with the global stage when
//! the cell's fractional value is low enough.

use serde::{Deserialize, Serialize};

/// Number of distinct stages. Stage arithmetic wraps modulo this value.
pub const MAX_STAGE: u8 = 6;

/// A stage value outside `0..MAX_STAGE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("stage {0} is out of range (must be below {MAX_STAGE})")]
pub struct InvalidStage(pub u8);

/// An update-rule selector in `0..MAX_STAGE`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stage(u8);

impl Stage {
    /// The initial stage of every cell and of the global counter.
    pub const ZERO: Self = Self(0);

    /// Build a stage, rejecting values at or above [`MAX_STAGE`].
    pub const fn new(value: u8) -> Result<Self, InvalidStage> {
        if value < MAX_STAGE {
            Ok(Self(value))
        } else {
            Err(InvalidStage(value))
        }
    }

    /// The raw stage number.
    pub const fn value(self) -> u8 {
        self.0
    }

    /// The following stage, wrapping back to zero after the last one.
    #[must_use]
    pub const fn next(self) -> Self {
        // self.0 < MAX_STAGE, so the increment cannot overflow.
        let bumped = self.0.saturating_add(1);
        if bumped >= MAX_STAGE {
            Self::ZERO
        } else {
            Self(bumped)
        }
    }
}

impl TryFrom<u8> for Stage {
    type Error = InvalidStage;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> Self {
        stage.0
    }
}
