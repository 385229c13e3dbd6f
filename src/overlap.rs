use std::fmt;

use anyhow::ensure;

use crate::{align::PrefixEditDistance, delta::splice};

/// How a seeded alignment between two reads ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlapKind {
    /// Neither a clean overlap nor a trustworthy branch point.
    None,
    /// Alignment diverges to the left of the seed.
    LeftBranchPt,
    /// Alignment diverges to the right of the seed.
    RightBranchPt,
    /// Alignment runs off an end of a read on both sides.
    Dovetail,
}

impl OverlapKind {
    /// Name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlapKind::None => "NONE",
            OverlapKind::LeftBranchPt => "LEFT_BRANCH_PT",
            OverlapKind::RightBranchPt => "RIGHT_BRANCH_PT",
            OverlapKind::Dovetail => "DOVETAIL",
        }
    }
}

impl fmt::Display for OverlapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact match between two reads, one link of a seed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchNode {
    /// Start of the match in the first read.
    pub offset: i32,
    /// Length of the match.
    pub len: i32,
    /// Start of the match in the second read.
    pub start: i32,
    /// Index of the next seed in the owning pool.
    pub next: Option<usize>,
}

impl MatchNode {
    /// Walk a seed list stored in `pool`, starting at `head`.
    /// * Stops at the first link pointing outside of `pool`.
    /// * A list with a cycle never ends.
    pub fn chain(pool: &[MatchNode], head: Option<usize>) -> impl Iterator<Item = &MatchNode> + '_ {
        std::iter::successors(head.and_then(|i| pool.get(i)), move |node| {
            node.next.and_then(|i| pool.get(i))
        })
    }
}

/// Borrowed read.
#[derive(Debug, Clone, Copy)]
pub struct ReadView<'a> {
    /// Read identifier. Only used in log messages.
    pub id: u32,
    /// Bases.
    pub seq: &'a [u8],
}

impl<'a> ReadView<'a> {
    /// New view over `seq`.
    pub fn new(id: u32, seq: &'a [u8]) -> Self {
        ReadView { id, seq }
    }
}

/// Classified alignment around a seed.
///
/// Coordinates are half-open, `[s_lo, s_hi)` in the first read and `[t_lo, t_hi)` in the second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    /// Verdict.
    pub kind: OverlapKind,
    /// Start in the first read.
    pub s_lo: i32,
    /// End in the first read.
    pub s_hi: i32,
    /// Start in the second read.
    pub t_lo: i32,
    /// End in the second read.
    pub t_hi: i32,
    /// Errors on both sides of the seed.
    pub errors: i32,
    /// Delta script over the aligned ranges, with the first read as the first sequence.
    pub delta: Vec<i32>,
}

/// One half of an extension, in read coordinates.
struct Half {
    s: i32,
    t: i32,
    errors: i32,
    leftover: i32,
    to_end: bool,
}

impl PrefixEditDistance {
    /// Extend a seed in both directions and classify the result.
    ///
    /// The right half is extended first with an error budget derived from the longest possible
    /// overlap, the left half gets what the right half left over. Each half runs with the read
    /// that has less sequence on that side as the first sequence.
    ///
    /// A half that stopped short of the read ends is a branch point when it stopped at least
    /// [`min_branch_end_dist`](Self::min_branch_end_dist) bases from every end of both reads.
    /// If both halves qualify, the right one is reported.
    ///
    /// # Arguments
    /// * `seed`: Exact match between the reads.
    /// * `s`: First read. Seed `offset` is a position in it.
    /// * `t`: Second read. Seed `start` is a position in it.
    ///
    /// # Returns
    /// * [`Overlap`], or an error if the seed falls outside either read or a read is longer than
    ///   the maximum read length.
    pub fn extend_alignment(
        &mut self,
        seed: &MatchNode,
        s: ReadView,
        t: ReadView,
    ) -> anyhow::Result<Overlap> {
        self.check_len(s.seq.len())?;
        self.check_len(t.seq.len())?;

        let (s_len, t_len) = (s.seq.len() as i32, t.seq.len() as i32);
        ensure!(
            (0..=s_len).contains(&seed.offset)
                && (0..=t_len).contains(&seed.start)
                && seed.len >= 0
                && seed.len <= s_len - seed.offset
                && seed.len <= t_len - seed.start,
            "Seed {seed:?} falls outside reads {} ({s_len} bases) and {} ({t_len} bases).",
            s.id,
            t.id
        );

        let s_right = seed.offset + seed.len;
        let t_right = seed.start + seed.len;
        let total_olap =
            seed.offset.min(seed.start) + seed.len + (s_len - s_right).min(t_len - t_right);
        let error_limit = self.bound.for_len(total_olap as usize)?;

        let right = self.extend_right(s.seq, t.seq, s_right, t_right, error_limit)?;
        let left = self.extend_left(s.seq, t.seq, seed, error_limit - right.errors)?;

        let min = self.min_branch_end_dist;
        let far_from_ends = |half: &Half| {
            half.s >= min && half.s <= s_len - min && half.t >= min && half.t <= t_len - min
        };

        let kind = if !right.to_end && far_from_ends(&right) {
            OverlapKind::RightBranchPt
        } else if !left.to_end && far_from_ends(&left) {
            OverlapKind::LeftBranchPt
        } else if right.to_end && left.to_end {
            OverlapKind::Dovetail
        } else {
            OverlapKind::None
        };

        let overlap = Overlap {
            kind,
            s_lo: left.s,
            s_hi: right.s,
            t_lo: left.t,
            t_hi: right.t,
            errors: left.errors + right.errors,
            delta: splice(
                self.deltas.left(),
                left.leftover,
                seed.len,
                self.deltas.right(),
            ),
        };
        log::trace!(
            "Reads {} and {}: {kind} over [{}, {}) x [{}, {}) with {} errors.",
            s.id,
            t.id,
            overlap.s_lo,
            overlap.s_hi,
            overlap.t_lo,
            overlap.t_hi,
            overlap.errors
        );
        Ok(overlap)
    }

    fn extend_right(
        &mut self,
        s: &[u8],
        t: &[u8],
        s_right: i32,
        t_right: i32,
        error_limit: i32,
    ) -> anyhow::Result<Half> {
        let s_rest = &s[s_right as usize..];
        let t_rest = &t[t_right as usize..];

        if s_rest.is_empty() || t_rest.is_empty() {
            self.deltas.clear_right();
            return Ok(Half {
                s: s_right,
                t: t_right,
                errors: 0,
                leftover: 0,
                to_end: true,
            });
        }

        let (s_end, t_end, ext) = if s_rest.len() <= t_rest.len() {
            let ext = self.forward(s_rest, t_rest, error_limit)?;
            (ext.a_end, ext.t_end, ext)
        } else {
            let ext = self.forward(t_rest, s_rest, error_limit)?;
            self.deltas.negate_right();
            (ext.t_end, ext.a_end, ext)
        };

        Ok(Half {
            s: s_right + s_end,
            t: t_right + t_end,
            errors: ext.errors,
            leftover: 0,
            to_end: ext.match_to_end,
        })
    }

    fn extend_left(
        &mut self,
        s: &[u8],
        t: &[u8],
        seed: &MatchNode,
        error_limit: i32,
    ) -> anyhow::Result<Half> {
        if seed.offset == 0 || seed.start == 0 {
            self.deltas.clear_left();
            return Ok(Half {
                s: seed.offset,
                t: seed.start,
                errors: 0,
                leftover: 0,
                to_end: true,
            });
        }

        let s_prefix = &s[..seed.offset as usize];
        let t_prefix = &t[..seed.start as usize];

        let (s_lo, t_lo, ext) = if seed.offset <= seed.start {
            let ext = self.reverse(s_prefix, t_prefix, error_limit)?;
            (ext.a_end, ext.t_end, ext)
        } else {
            let ext = self.reverse(t_prefix, s_prefix, error_limit)?;
            self.deltas.negate_left();
            (ext.t_end, ext.a_end, ext)
        };

        Ok(Half {
            s: s_lo,
            t: t_lo,
            errors: ext.errors,
            leftover: ext.leftover,
            to_end: ext.match_to_end,
        })
    }
}
