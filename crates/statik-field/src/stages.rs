//! Per-cell stage labels.

use statik_types::Stage;

/// The stage each cell is currently using, one label per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageMap {
    labels: Vec<Stage>,
}

impl StageMap {
    /// `cells` labels, all at [`Stage::ZERO`].
    pub fn new(cells: usize) -> Self {
        Self {
            labels: vec![Stage::ZERO; cells],
        }
    }

    /// Label of `index` ([`Stage::ZERO`] outside the map).
    pub fn get(&self, index: usize) -> Stage {
        self.labels.get(index).copied().unwrap_or_default()
    }

    /// Overwrite the label of `index`.
    pub fn set(&mut self, index: usize, stage: Stage) {
        if let Some(label) = self.labels.get_mut(index) {
            *label = stage;
        }
    }

    /// Move `index` onto `global` when `eligible`. Returns `true` when the
    /// label actually changed.
    pub fn adopt(&mut self, index: usize, global: Stage, eligible: bool) -> bool {
        match self.labels.get_mut(index) {
            Some(label) if eligible && *label != global => {
                *label = global;
                true
            }
            _ => false,
        }
    }

    /// Number of cells whose label equals `stage`.
    pub fn count(&self, stage: Stage) -> usize {
        self.labels.iter().filter(|&&label| label == stage).count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn adoption_requires_eligibility() {
        let mut map = StageMap::new(4);
        let two = Stage::new(2).unwrap();
        assert!(!map.adopt(1, two, false));
        assert_eq!(map.get(1), Stage::ZERO);
        assert!(map.adopt(1, two, true));
        assert_eq!(map.get(1), two);
        // Already on the global stage: no change reported.
        assert!(!map.adopt(1, two, true));
        assert_eq!(map.count(two), 1);
    }
}
