use anyhow::bail;

use crate::{bound::ErrorBound, config::ExtendConfig, delta::DeltaEncoder, space::EditSpace};

/// Result of extending an alignment to the right of a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardExtension {
    /// Errors in the alignment.
    pub errors: i32,
    /// Bases of the first sequence covered, from its start.
    pub a_end: i32,
    /// Bases of the second sequence covered, from its start.
    pub t_end: i32,
    /// Alignment reached the end of either sequence.
    /// * If false, it stopped at the best scoring point before the end, a branch point.
    pub match_to_end: bool,
}

/// Result of extending an alignment to the left of a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReverseExtension {
    /// Errors in the alignment.
    pub errors: i32,
    /// Index in the first sequence where the alignment starts.
    pub a_end: i32,
    /// Index in the second sequence where the alignment starts.
    pub t_end: i32,
    /// Aligned columns between the indel nearest the seed and the seed.
    /// * Not part of [`PrefixEditDistance::left_delta`]. Needed to join both halves, see [`splice`](crate::delta::splice).
    pub leftover: i32,
    /// Alignment reached the start of either sequence.
    pub match_to_end: bool,
}

/// Banded edit distance extension engine.
///
/// Holds the error tables derived from the configuration and the scratch space reused by every
/// extension. Not meant to be shared: use one engine per thread.
#[derive(Debug, Clone)]
pub struct PrefixEditDistance {
    pub(crate) config: ExtendConfig,
    pub(crate) bound: ErrorBound,
    pub(crate) space: EditSpace,
    pub(crate) deltas: DeltaEncoder,
    pub(crate) min_branch_end_dist: i32,
    pub(crate) min_branch_tail_slope: f64,
    pub(crate) branch_match_value: f64,
    pub(crate) branch_error_value: f64,
}

impl PrefixEditDistance {
    /// New engine for the given error rate, with defaults otherwise.
    ///
    /// ### Example
    /// ```
    /// use rs_prefix_edit::PrefixEditDistance;
    ///
    /// let mut engine = PrefixEditDistance::new(false, 0.06).unwrap();
    /// let ext = engine.forward(b"ACGTTGCA", b"ACGATGCA", 2).unwrap();
    /// assert_eq!(ext.errors, 1);
    /// assert!(ext.match_to_end);
    /// ```
    pub fn new(partial_overlaps: bool, max_erate: f64) -> anyhow::Result<Self> {
        Self::with_config(ExtendConfig::new(partial_overlaps, max_erate))
    }

    /// New engine from an [`ExtendConfig`].
    pub fn with_config(config: ExtendConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let bound = ErrorBound::new(config.max_erate, config.max_read_len);
        let space = EditSpace::new(bound.max_errors() as usize);
        let branch_match_value = config.branch_match();

        log::debug!(
            "Extension engine: error rate {}, max read length {}, max errors {}.",
            config.max_erate,
            config.max_read_len,
            bound.max_errors()
        );

        Ok(PrefixEditDistance {
            min_branch_end_dist: config.branch_end_dist(),
            min_branch_tail_slope: config.branch_tail_slope(),
            branch_match_value,
            branch_error_value: branch_match_value - 1.0,
            config,
            bound,
            space,
            deltas: DeltaEncoder::default(),
        })
    }

    /// Configuration the engine was built from.
    pub fn config(&self) -> &ExtendConfig {
        &self.config
    }

    /// Error limits for this engine's error rate.
    pub fn error_bound(&self) -> &ErrorBound {
        &self.bound
    }

    /// Most errors in any single extension.
    pub fn max_errors(&self) -> i32 {
        self.bound.max_errors()
    }

    /// Minimum distance of a reported branch point from the end of a read.
    pub fn min_branch_end_dist(&self) -> i32 {
        self.min_branch_end_dist
    }

    /// Rate at which a branch point tail must fall off from the best score.
    pub fn min_branch_tail_slope(&self) -> f64 {
        self.min_branch_tail_slope
    }

    /// Score of an aligned base when looking for branch points.
    pub fn branch_match_value(&self) -> f64 {
        self.branch_match_value
    }

    /// Score of an error when looking for branch points.
    pub fn branch_error_value(&self) -> f64 {
        self.branch_error_value
    }

    /// Shared workspace. Exposed to inspect its growth.
    pub fn edit_space(&self) -> &EditSpace {
        &self.space
    }

    /// Delta script of the last [`forward`](Self::forward) extension.
    pub fn right_delta(&self) -> &[i32] {
        self.deltas.right()
    }

    /// Delta script of the last [`reverse`](Self::reverse) extension.
    pub fn left_delta(&self) -> &[i32] {
        self.deltas.left()
    }

    /// Fewest edits aligning a prefix of `a` with a prefix of `t`, up to `error_limit` errors.
    ///
    /// * @param `a`: First sequence, starting right after the seed.
    /// * @param `t`: Second sequence, starting right after the seed.
    /// * @param `error_limit`: Error budget. Capped at [`max_errors`](Self::max_errors) minus one.
    ///
    /// Leaves the script of the alignment in [`right_delta`](Self::right_delta).
    pub fn forward(
        &mut self,
        a: &[u8],
        t: &[u8],
        error_limit: i32,
    ) -> anyhow::Result<ForwardExtension> {
        self.check_len(a.len())?;
        self.check_len(t.len())?;

        let reach = self.search::<false>(a, t, error_limit);
        let t_end = self.deltas.set_right(
            &self.space,
            reach.errors,
            reach.diagonal,
            reach.row + reach.diagonal,
            t.len() as i32,
        );

        let ext = ForwardExtension {
            errors: reach.errors,
            a_end: reach.row,
            t_end,
            match_to_end: reach.to_end,
        };
        log::trace!("Forward extension: {ext:?}");
        Ok(ext)
    }

    /// Fewest edits aligning a suffix of `a` with a suffix of `t`, up to `error_limit` errors.
    ///
    /// * @param `a`: First sequence, ending right before the seed.
    /// * @param `t`: Second sequence, ending right before the seed.
    /// * @param `error_limit`: Error budget. Capped at [`max_errors`](Self::max_errors) minus one.
    ///
    /// Leaves the script of the alignment in [`left_delta`](Self::left_delta).
    pub fn reverse(
        &mut self,
        a: &[u8],
        t: &[u8],
        error_limit: i32,
    ) -> anyhow::Result<ReverseExtension> {
        self.check_len(a.len())?;
        self.check_len(t.len())?;

        let (m, n) = (a.len() as i32, t.len() as i32);
        let reach = self.search::<true>(a, t, error_limit);
        let (leftover, t_consumed) = self.deltas.set_left(
            &self.space,
            reach.errors,
            reach.diagonal,
            reach.row + reach.diagonal,
            n,
        );

        let ext = ReverseExtension {
            errors: reach.errors,
            a_end: m - reach.row,
            t_end: n - t_consumed,
            leftover,
            match_to_end: reach.to_end,
        };
        log::trace!("Reverse extension: {ext:?}");
        Ok(ext)
    }

    pub(crate) fn check_len(&self, len: usize) -> anyhow::Result<()> {
        if len > self.config.max_read_len {
            bail!(
                "Sequence of length {len} exceeds maximum read length {}.",
                self.config.max_read_len
            )
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn engine() -> PrefixEditDistance {
        PrefixEditDistance::with_config(ExtendConfig {
            max_read_len: 2010,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_constants() {
        let engine = engine();
        assert_eq!(engine.max_errors(), 122);
        assert_eq!(engine.min_branch_end_dist(), 20);
        assert_eq!(engine.min_branch_tail_slope(), 0.2);
        assert!((engine.branch_match_value() - engine.branch_error_value() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_engine() {
        assert!(PrefixEditDistance::new(false, 1.5).is_err());
    }

    #[test]
    fn test_forward_identity() {
        let mut engine = engine();
        let seq = b"ACGTTGCATGCATTGACCAGT";
        let ext = engine.forward(seq, seq, 3).unwrap();
        assert_eq!(
            ext,
            ForwardExtension {
                errors: 0,
                a_end: 21,
                t_end: 21,
                match_to_end: true
            }
        );
        assert!(engine.right_delta().is_empty());
    }

    #[test]
    fn test_forward_empty() {
        let mut engine = engine();
        let ext = engine.forward(b"", b"ACGT", 3).unwrap();
        assert_eq!(ext.errors, 0);
        assert_eq!(ext.a_end, 0);
        assert!(ext.match_to_end);
    }

    #[test]
    fn test_forward_shorter_second() {
        let mut engine = engine();
        let ext = engine.forward(b"ACGTACGTAA", b"ACGTAC", 2).unwrap();
        assert_eq!(ext.errors, 0);
        assert_eq!((ext.a_end, ext.t_end), (6, 6));
        assert!(ext.match_to_end);
    }

    #[test]
    fn test_forward_insertion() {
        let mut engine = engine();
        // Extra T in the first sequence after 8 bases.
        let a = b"ACGTTGCATGACCAGTTAGC";
        let t = b"ACGTTGCAGACCAGTTAGC";
        let ext = engine.forward(a, t, 2).unwrap();
        assert_eq!(ext.errors, 1);
        assert_eq!((ext.a_end, ext.t_end), (20, 19));
        assert!(ext.match_to_end);
        assert_eq!(engine.right_delta(), [9]);
    }

    #[test]
    fn test_forward_deletion() {
        let mut engine = engine();
        let a = b"ACGTTGCAGACCAGTTAGC";
        let t = b"ACGTTGCATGACCAGTTAGC";
        let ext = engine.forward(a, t, 2).unwrap();
        assert_eq!(ext.errors, 1);
        assert_eq!((ext.a_end, ext.t_end), (19, 20));
        assert_eq!(engine.right_delta(), [-9]);
    }

    #[test]
    fn test_forward_last_base_substitution() {
        let mut engine = engine();
        let ext = engine.forward(b"ACGTACGTAC", b"ACGTACGTAG", 2).unwrap();
        assert_eq!(ext.errors, 1);
        assert_eq!((ext.a_end, ext.t_end), (10, 10));
        assert!(ext.match_to_end);
        assert!(engine.right_delta().is_empty());

        // Nothing left of the second sequence to pair with the last base.
        let ext = engine.forward(b"ACGTACGTAC", b"ACGTACGTA", 2).unwrap();
        assert_eq!(ext.errors, 0);
        assert_eq!((ext.a_end, ext.t_end), (9, 9));
        assert!(ext.match_to_end);
    }

    #[test]
    fn test_forward_no_budget() {
        let mut engine = engine();
        let a = b"ACGTTGCATGCA";
        let t = b"ACGTAGCATGCA";
        let ext = engine.forward(a, t, 0).unwrap();
        assert_eq!(ext.errors, 0);
        assert_eq!((ext.a_end, ext.t_end), (4, 4));
        assert!(!ext.match_to_end);
    }

    #[test]
    fn test_reverse_substitution() {
        let mut engine = engine();
        let a = b"TTGACCAGTACGTTGCA";
        let t = b"TTGACCAGAACGTTGCA";
        let ext = engine.reverse(a, t, 2).unwrap();
        assert_eq!(ext.errors, 1);
        assert_eq!((ext.a_end, ext.t_end), (0, 0));
        assert_eq!(ext.leftover, 17);
        assert!(ext.match_to_end);
        assert!(engine.left_delta().is_empty());
    }

    #[test]
    fn test_reverse_insertion() {
        let mut engine = engine();
        // Extra G in the first sequence, 8 bases before the end.
        let a = b"TTGACCAGTAGCCGTTGCA";
        let t = b"TTGACCAGTACCGTTGCA";
        let ext = engine.reverse(a, t, 2).unwrap();
        assert_eq!(ext.errors, 1);
        assert_eq!((ext.a_end, ext.t_end), (0, 0));
        assert_eq!(engine.left_delta(), [11]);
        assert_eq!(ext.leftover, 8);
    }

    #[test]
    fn test_too_long() {
        let mut engine = PrefixEditDistance::with_config(ExtendConfig {
            max_read_len: 10,
            ..Default::default()
        })
        .unwrap();
        assert!(engine.forward(&[b'A'; 11], b"ACGT", 1).is_err());
        assert!(engine.reverse(b"ACGT", &[b'A'; 11], 1).is_err());
    }
}
