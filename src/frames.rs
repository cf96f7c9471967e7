//! Frame index arithmetic.

/// The set of valid frame indices and how out-of-range indices are brought back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRange {
    count: usize,
    cycle: bool,
}

impl FrameRange {
    pub fn new(count: usize, cycle: bool) -> Self {
        Self { count, cycle }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn cycle(&self) -> bool {
        self.cycle
    }

    pub fn set_cycle(&mut self, cycle: bool) {
        self.cycle = cycle;
    }

    /// Index of the last frame (0 for an empty range).
    #[inline]
    pub fn last(&self) -> usize {
        self.count.saturating_sub(1)
    }

    /// Map any index into `[0, count - 1]`.
    ///
    /// Cycling wraps with full modulo arithmetic, so an overshoot of several
    /// turns still lands in range. Without cycling the index is clamped.
    ///
    /// ```rust
    /// use spin_view::FrameRange;
    ///
    /// let range = FrameRange::new(8, true);
    /// assert_eq!(range.normalize(-1), 7);
    /// assert_eq!(range.normalize(8), 0);
    ///
    /// let range = FrameRange::new(4, false);
    /// assert_eq!(range.normalize(-1), 0);
    /// assert_eq!(range.normalize(5), 3);
    /// ```
    pub fn normalize(&self, index: i64) -> usize {
        if self.count == 0 {
            return 0;
        }
        let count = self.count as i64;
        let normalized = if self.cycle {
            index.rem_euclid(count)
        } else {
            index.clamp(0, count - 1)
        };
        normalized as usize
    }

    /// Normalize `from + delta`.
    #[inline]
    pub fn offset(&self, from: usize, delta: i64) -> usize {
        self.normalize((from as i64).saturating_add(delta))
    }
}
