use crate::align::PrefixEditDistance;

/// Written into row `e - 1` just outside the band before row `e` is computed.
/// * Loses against any reached cell, so stale values from earlier calls are never read.
const OUT_OF_BAND: i32 = -2;

/// Where a wavefront search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Reach {
    /// Errors used.
    pub errors: i32,
    /// Diagonal `d`. Position in the second sequence is `row + d`.
    pub diagonal: i32,
    /// Bases of the first sequence covered.
    pub row: i32,
    /// Reached the end of either sequence.
    pub to_end: bool,
}

/// Base `i` counted from the start, or from the end when extending leftwards.
#[inline(always)]
fn base<const REVERSE: bool>(seq: &[u8], i: i32) -> u8 {
    if REVERSE {
        seq[seq.len() - 1 - i as usize]
    } else {
        seq[i as usize]
    }
}

impl PrefixEditDistance {
    /// Score of reaching `row` with `e` errors.
    #[inline]
    fn branch_score(&self, row: i32, e: i32) -> f64 {
        f64::from(row) * self.branch_match_value
            - f64::from(e) * (self.branch_match_value - self.branch_error_value)
    }

    /// Wavefront search for the best alignment of a prefix of `a` with a prefix of `t`.
    ///
    /// With `REVERSE`, both sequences are read from their ends towards their starts.
    ///
    /// For each error count `e`, each diagonal of the band takes the best predecessor from row
    /// `e - 1` and slides along matching bases. The band then shrinks from both sides where the
    /// reach is too short to be worth `e` errors. The search ends when a diagonal hits the end of
    /// either sequence, the band empties or the error limit is spent. Of the diagonals hitting an
    /// end with the same error count, the one covering most of `a`, then most of `t`, is taken.
    pub(crate) fn search<const REVERSE: bool>(
        &mut self,
        a: &[u8],
        t: &[u8],
        error_limit: i32,
    ) -> Reach {
        let (m, n) = (a.len() as i32, t.len() as i32);

        let mut row = 0;
        while row < m && row < n && base::<REVERSE>(a, row) == base::<REVERSE>(t, row) {
            row += 1;
        }

        self.space.ensure(0);
        self.space[(0, 0)] = row;

        let mut best = Reach {
            errors: 0,
            diagonal: 0,
            row,
            to_end: row == m || row == n,
        };
        if best.to_end {
            return best;
        }
        let mut max_score = self.branch_score(row, 0);

        let error_limit = error_limit.min(self.bound.max_errors() - 1);
        let (mut left, mut right) = (0, 0);

        for e in 1..=error_limit {
            self.space.ensure(e as usize);

            left = (left - 1).max(-e);
            right = (right + 1).min(e);

            for d in [left, left - 1, right, right + 1] {
                self.space[(e - 1, d)] = OUT_OF_BAND;
            }

            // Furthest diagonal hitting an end: most of `a`, then most of `t`.
            let mut end: Option<(i32, i32)> = None;
            for d in left..=right {
                let (_, mut row) = self.space.predecessor(e, d);
                while row < m
                    && row + d < n
                    && base::<REVERSE>(a, row) == base::<REVERSE>(t, row + d)
                {
                    row += 1;
                }
                self.space[(e, d)] = row;

                if (row == m || row + d == n)
                    && end.map_or(true, |(end_d, end_row)| {
                        (row, row + d) > (end_row, end_row + end_d)
                    })
                {
                    end = Some((d, row));
                }
            }

            if let Some((mut d, row)) = end {
                // Errors piled up past the best point: branch point.
                let score = self.branch_score(row, e);
                let tail_len = row - best.row;
                if !self.config.partial_overlaps
                    && e - best.errors >= self.min_branch_end_dist / 2
                    && tail_len >= self.min_branch_end_dist
                    && max_score - score >= f64::from(tail_len) * self.min_branch_tail_slope
                {
                    return best;
                }

                // Last error as a substitution rather than a gap at the end.
                if row == m && d < right && 1 + self.space[(e - 1, d + 1)] == row {
                    d += 1;
                    self.space[(e, d)] = row;
                }

                return Reach {
                    errors: e,
                    diagonal: d,
                    row,
                    to_end: true,
                };
            }

            let limit = self.bound.match_limit(e);
            while left <= right && left < 0 && self.space[(e, left)] < limit {
                left += 1;
            }
            if left >= 0 {
                while left <= right && self.space[(e, left)] + left < limit {
                    left += 1;
                }
            }
            if left > right {
                break;
            }
            while right > left && right > 0 && self.space[(e, right)] + right < limit {
                right -= 1;
            }
            if right <= 0 {
                while right > left && self.space[(e, right)] < limit {
                    right -= 1;
                }
            }

            let (mut longest, mut longest_d) = (0, 0);
            for d in left..=right {
                if self.space[(e, d)] > longest {
                    longest = self.space[(e, d)];
                    longest_d = d;
                }
            }

            let score = self.branch_score(longest, e);
            if score > max_score {
                max_score = score;
                best = Reach {
                    errors: e,
                    diagonal: longest_d,
                    row: longest,
                    to_end: false,
                };
            }
        }

        best
    }
}
