use anyhow::bail;

/// Describes CIGAR format.
/// * See http://samtools.github.io/hts-specs/SAMv1.pdf
/// * See http://drive5.com/usearch/manual/cigar.html
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CigarFormat {
    #[default]
    /// Match: 'M', Insertion: 'I', Deletion: 'D', Mismatch: 'M'.
    Standard,
    /// Match: '=', Insertion: 'I', Deletion: 'D', Mismatch: 'X'.
    Extended,
}

/// One column of an alignment of a first sequence (query) against a second (target).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    /// Match
    Match,
    /// Base of the first sequence against a gap in the second.
    ///
    /// ### Example:
    /// * First:  `ATCG`
    /// * Second: `A-CG`
    Insert,
    /// Base of the second sequence against a gap in the first.
    ///
    /// ### Example:
    /// * First:  `A-CG`
    /// * Second: `ATCG`
    Delete,
    /// Mismatch
    Mismatch,
}

impl EditOp {
    /// Counts against the edit distance?
    pub fn is_error(&self) -> bool {
        !matches!(self, EditOp::Match)
    }

    fn symbol(&self, format: CigarFormat) -> char {
        match (self, format) {
            (EditOp::Match | EditOp::Mismatch, CigarFormat::Standard) => 'M',
            (EditOp::Match, CigarFormat::Extended) => '=',
            (EditOp::Mismatch, CigarFormat::Extended) => 'X',
            (EditOp::Insert, _) => 'I',
            (EditOp::Delete, _) => 'D',
        }
    }
}

/// Expand a delta script over the aligned parts of two sequences.
///
/// # Arguments
/// * `a`: Aligned part of the first sequence.
/// * `t`: Aligned part of the second sequence.
/// * `delta`: Delta script, see [`delta`](crate::delta).
///
/// # Returns
/// * One [`EditOp`] per alignment column.
///
/// # Examples
/// ```
/// use rs_prefix_edit::cigar::{edit_ops, to_cigar, CigarFormat};
///
/// let ops = edit_ops(b"ACGTTAC", b"ACGTAG", &[5]).unwrap();
/// assert_eq!(to_cigar(&ops, CigarFormat::Extended), "4=1I1=1X");
/// ```
pub fn edit_ops(a: &[u8], t: &[u8], delta: &[i32]) -> anyhow::Result<Vec<EditOp>> {
    let mut ops = Vec::with_capacity(a.len().max(t.len()));
    let (mut i, mut j) = (0, 0);

    fn aligned(
        a: &[u8],
        t: &[u8],
        i: &mut usize,
        j: &mut usize,
        len: usize,
        ops: &mut Vec<EditOp>,
    ) {
        for _ in 0..len {
            ops.push(if a[*i] == t[*j] {
                EditOp::Match
            } else {
                EditOp::Mismatch
            });
            *i += 1;
            *j += 1;
        }
    }

    for &step in delta {
        if step == 0 {
            bail!("Delta script {delta:?} holds a zero entry.");
        }
        let run = (step.unsigned_abs() - 1) as usize;
        let (a_need, t_need) = if step > 0 {
            (run + 1, run)
        } else {
            (run, run + 1)
        };
        if i + a_need > a.len() || j + t_need > t.len() {
            bail!(
                "Delta script {delta:?} overruns sequences of length {} and {}.",
                a.len(),
                t.len()
            );
        }

        aligned(a, t, &mut i, &mut j, run, &mut ops);
        if step > 0 {
            ops.push(EditOp::Insert);
            i += 1;
        } else {
            ops.push(EditOp::Delete);
            j += 1;
        }
    }

    if a.len() - i != t.len() - j {
        bail!(
            "Delta script {delta:?} leaves {} and {} bases unaligned.",
            a.len() - i,
            t.len() - j
        );
    }
    let rest = a.len() - i;
    aligned(a, t, &mut i, &mut j, rest, &mut ops);

    Ok(ops)
}

/// Run length encode edit operations as a CIGAR string.
pub fn to_cigar(ops: &[EditOp], format: CigarFormat) -> String {
    let mut cigar = String::new();
    let mut ops = ops.iter().map(|op| op.symbol(format)).peekable();

    while let Some(symbol) = ops.next() {
        let mut count = 1;
        while ops.next_if_eq(&symbol).is_some() {
            count += 1;
        }
        cigar.push_str(&count.to_string());
        cigar.push(symbol);
    }
    cigar
}
