use std::ops::{Index, IndexMut};

/// Sentinel cells kept on each side of a row's `[-e, e]` diagonal band.
/// * Row `e - 1` is read at `d - 1` and `d + 1` while row `e` is computed.
pub const BAND_MARGIN: i32 = 2;

/// Rows added at least per growth.
const MIN_GROWTH: usize = 16;

/// Lazily grown wavefront workspace.
///
/// Row `e` holds, for each diagonal `d` in `[-e - 2, e + 2]`, the furthest row of the first
/// sequence reached on that diagonal with exactly `e` errors. Rows are only ever added and
/// are reused as scratch by later extensions.
#[derive(Debug, Clone)]
pub struct EditSpace {
    rows: Vec<Vec<i32>>,
    max_errors: usize,
}

impl EditSpace {
    /// Empty workspace that may grow up to `max_errors` rows.
    pub fn new(max_errors: usize) -> Self {
        EditSpace {
            rows: Vec::new(),
            max_errors,
        }
    }

    /// Number of rows allocated so far.
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Largest number of rows this workspace may hold.
    pub fn max_errors(&self) -> usize {
        self.max_errors
    }

    /// Make sure rows `0..=e` exist, doubling the row count when growing.
    ///
    /// # Panics
    /// * If `e` is not below the maximum error count.
    pub fn ensure(&mut self, e: usize) {
        if e < self.rows.len() {
            return;
        }
        assert!(
            e < self.max_errors,
            "Error count {e} exceeds maximum of {} errors.",
            self.max_errors
        );

        let have = self.rows.len();
        let want = (e + 1)
            .max(have * 2)
            .max(MIN_GROWTH)
            .min(self.max_errors);

        log::debug!("Growing edit space from {have} to {want} rows.");

        self.rows.reserve_exact(want - have);
        for row in have..want {
            self.rows
                .push(vec![0; 2 * row + 2 * BAND_MARGIN as usize + 1]);
        }
    }

    /// Best way to reach diagonal `d` with `e` errors from row `e - 1`.
    ///
    /// Candidates in order, first strict maximum wins:
    /// * `d`: substitution, one further along the same diagonal.
    /// * `d - 1`: a base of the second sequence against a gap.
    /// * `d + 1`: a base of the first sequence against a gap.
    ///
    /// # Returns
    /// * `(from, row)` diagonal taken and the row it reaches on `d`.
    #[inline]
    pub fn predecessor(&self, e: i32, d: i32) -> (i32, i32) {
        let mut from = d;
        let mut row = 1 + self[(e - 1, d)];

        let gap = self[(e - 1, d - 1)];
        if gap > row {
            from = d - 1;
            row = gap;
        }
        let gap = 1 + self[(e - 1, d + 1)];
        if gap > row {
            from = d + 1;
            row = gap;
        }
        (from, row)
    }

    #[inline]
    fn slot(&self, (e, d): (i32, i32)) -> Option<(usize, usize)> {
        let row = usize::try_from(e).ok()?;
        let col = usize::try_from(d + e + BAND_MARGIN).ok()?;
        (col < self.rows.get(row)?.len()).then_some((row, col))
    }
}

/// Index into `EditSpace` by (error count, diagonal).
impl Index<(i32, i32)> for EditSpace {
    type Output = i32;

    fn index(&self, index: (i32, i32)) -> &i32 {
        match self.slot(index) {
            Some((row, col)) => &self.rows[row][col],
            None => panic!("Cell {index:?} outside of allocated edit space."),
        }
    }
}

impl IndexMut<(i32, i32)> for EditSpace {
    fn index_mut(&mut self, index: (i32, i32)) -> &mut i32 {
        match self.slot(index) {
            Some((row, col)) => &mut self.rows[row][col],
            None => panic!("Cell {index:?} outside of allocated edit space."),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ensure_grows_lazily() {
        let mut space = EditSpace::new(100);
        assert_eq!(space.rows(), 0);

        space.ensure(0);
        assert_eq!(space.rows(), MIN_GROWTH);

        space.ensure(20);
        assert_eq!(space.rows(), 32);

        space.ensure(70);
        assert_eq!(space.rows(), 71);

        // Never past the maximum, never shrinks.
        space.ensure(72);
        assert_eq!(space.rows(), 100);
        space.ensure(3);
        assert_eq!(space.rows(), 100);
    }

    #[test]
    fn test_growth_preserves_rows() {
        let mut space = EditSpace::new(1000);
        space.ensure(5);
        space[(5, -5)] = 11;
        space[(5, 7)] = 13;

        space.ensure(500);
        assert_eq!(space[(5, -5)], 11);
        assert_eq!(space[(5, 7)], 13);
    }

    #[test]
    fn test_band_margin() {
        let mut space = EditSpace::new(10);
        space.ensure(3);
        space[(3, -5)] = 1;
        space[(3, 5)] = 2;
        assert_eq!(space[(3, -5)], 1);
        assert_eq!(space[(3, 5)], 2);
    }

    #[test]
    #[should_panic]
    fn test_outside_band() {
        let mut space = EditSpace::new(10);
        space.ensure(3);
        space[(3, 6)] = 1;
    }

    #[test]
    #[should_panic]
    fn test_unallocated_row() {
        let space = EditSpace::new(100);
        let _ = space[(0, 0)];
    }

    #[test]
    #[should_panic]
    fn test_past_max_errors() {
        let mut space = EditSpace::new(4);
        space.ensure(4);
    }

    #[test]
    fn test_predecessor() {
        let mut space = EditSpace::new(10);
        space.ensure(1);
        space[(0, -1)] = -2;
        space[(0, 0)] = 4;
        space[(0, 1)] = -2;

        // Substitution wins on the same diagonal.
        assert_eq!(space.predecessor(1, 0), (0, 5));
        // Diagonal -1 can only come from d + 1.
        assert_eq!(space.predecessor(1, -1), (0, 5));
        // Diagonal 1 only from d - 1, without advancing the first sequence.
        assert_eq!(space.predecessor(1, 1), (0, 4));
    }
}
