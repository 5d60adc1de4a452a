//! Cyclic buffer of pre-drawn random values.
//!
//! Stages 3 and 4 read from the same buffer through one shared cursor.
//! Stage 3 cycles over the full buffer (one grid line long); stage 4 cycles
//! over one element less, which makes its pattern drift against the grid's
//! rows.

use rand::Rng;

/// Fixed-size buffer of values in `[0, 1)` read through a shared cursor.
#[derive(Debug, Clone)]
pub struct RandomBuffer {
    values: Vec<f64>,
    cursor: usize,
}

impl RandomBuffer {
    /// Draw `len` independent uniform values from `rng`.
    pub fn draw<R: Rng>(len: usize, rng: &mut R) -> Self {
        Self {
            values: (0..len).map(|_| rng.random::<f64>()).collect(),
            cursor: 0,
        }
    }

    /// Build a buffer from explicit values (cursor at zero).
    pub const fn from_values(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Current cursor position.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Buffer length.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read at the cursor, then advance it modulo the full length.
    pub fn next_line(&mut self) -> f64 {
        let value = self.current();
        self.cursor = self
            .cursor
            .saturating_add(1)
            .checked_rem(self.values.len())
            .unwrap_or(0);
        value
    }

    /// Read at the cursor, then advance it modulo one less than the full
    /// length. The flag is `true` when the cursor wrapped back to zero.
    pub fn next_short(&mut self) -> (f64, bool) {
        let value = self.current();
        self.cursor = self
            .cursor
            .saturating_add(1)
            .checked_rem(self.values.len().saturating_sub(1))
            .unwrap_or(0);
        (value, self.cursor == 0)
    }

    fn current(&self) -> f64 {
        self.values.get(self.cursor).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn drawn_values_are_unit_interval() {
        let mut rng = StdRng::seed_from_u64(1);
        let buffer = RandomBuffer::draw(64, &mut rng);
        assert_eq!(buffer.len(), 64);
        assert!(buffer.values.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn line_cursor_wraps_at_full_length() {
        let mut buffer = RandomBuffer::from_values(vec![0.1, 0.2, 0.3]);
        let read: Vec<f64> = (0..4).map(|_| buffer.next_line()).collect();
        assert_eq!(read, vec![0.1, 0.2, 0.3, 0.1]);
        assert_eq!(buffer.cursor(), 1);
    }

    #[test]
    fn short_cursor_wraps_one_early() {
        let mut buffer = RandomBuffer::from_values(vec![0.1, 0.2, 0.3]);
        assert_eq!(buffer.next_short(), (0.1, false));
        assert_eq!(buffer.next_short(), (0.2, true));
        assert_eq!(buffer.next_short(), (0.1, false));
    }

    #[test]
    fn cursor_is_shared_between_rules() {
        let mut buffer = RandomBuffer::from_values(vec![0.1, 0.2, 0.3, 0.4]);
        buffer.next_line();
        buffer.next_line();
        // Cursor sits at 2; the short cycle has length 3 so the next read
        // wraps it to zero.
        assert_eq!(buffer.next_short(), (0.3, true));
        assert_eq!(buffer.next_line(), 0.1);
    }
}
