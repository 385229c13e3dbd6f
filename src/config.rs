use anyhow::bail;

/// Largest read length accepted when none is given.
pub const DEFAULT_MAX_READ_LEN: usize = 65_535;

/// Branch points must be at least this many bases from the end of a read to be reported.
pub const DEFAULT_MIN_BRANCH_END_DIST: u32 = 20;

/// Score added per aligned base when looking for branch points.
/// * Tuned for 6% vs 35% error discrimination.
/// * The matching error value is always this minus `1.0`.
pub const DEFAULT_BRANCH_MATCH_VALUE: f64 = 0.272;

#[derive(Debug, Clone)]
/// Extension configuration.
pub struct ExtendConfig {
    /// Maximum fraction of errors tolerated in an overlap. Must be in `[0, 1)`.
    pub max_erate: f64,
    /// Looking for partial overlaps?
    /// * Disables the branch point check that stops an extension whose tail falls off in score.
    pub partial_overlaps: bool,
    /// Longest read the engine will accept. Sizes the error bound table.
    pub max_read_len: usize,
    /// Minimum distance of a branch point from either read end.
    ///
    /// **If** None, [`DEFAULT_MIN_BRANCH_END_DIST`].
    pub min_branch_end_dist: Option<u32>,
    /// Rate at which a branch point tail must fall off from the best score.
    ///
    /// **If** None, `1.0` above 6% error and `0.2` otherwise.
    pub min_branch_tail_slope: Option<f64>,
    /// Score of an aligned base.
    ///
    /// **If** None, [`DEFAULT_BRANCH_MATCH_VALUE`].
    pub branch_match_value: Option<f64>,
}

impl Default for ExtendConfig {
    fn default() -> Self {
        ExtendConfig {
            max_erate: 0.06,
            partial_overlaps: false,
            max_read_len: DEFAULT_MAX_READ_LEN,
            min_branch_end_dist: None,
            min_branch_tail_slope: None,
            branch_match_value: None,
        }
    }
}

impl ExtendConfig {
    /// Configuration with the given error rate and partial overlap mode, defaults otherwise.
    pub fn new(partial_overlaps: bool, max_erate: f64) -> Self {
        ExtendConfig {
            max_erate,
            partial_overlaps,
            ..Default::default()
        }
    }

    /// Check that values are usable before building an engine.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..1.0).contains(&self.max_erate) {
            bail!("Error rate {} not in [0, 1).", self.max_erate)
        }
        if self.max_read_len == 0 || self.max_read_len > (i32::MAX / 4) as usize {
            bail!("Invalid maximum read length {}.", self.max_read_len)
        }
        if let Some(value) = self.branch_match_value {
            if !(value > 0.0 && value < 1.0) {
                bail!("Branch match value {value} not in (0, 1).")
            }
        }
        if let Some(slope) = self.min_branch_tail_slope {
            if !slope.is_finite() || slope < 0.0 {
                bail!("Invalid branch tail slope {slope}.")
            }
        }
        Ok(())
    }

    pub(crate) fn branch_end_dist(&self) -> i32 {
        self.min_branch_end_dist
            .unwrap_or(DEFAULT_MIN_BRANCH_END_DIST)
            .min(i32::MAX as u32) as i32
    }

    pub(crate) fn branch_tail_slope(&self) -> f64 {
        self.min_branch_tail_slope
            .unwrap_or(if self.max_erate > 0.06 { 1.0 } else { 0.20 })
    }

    pub(crate) fn branch_match(&self) -> f64 {
        self.branch_match_value.unwrap_or(DEFAULT_BRANCH_MATCH_VALUE)
    }
}
