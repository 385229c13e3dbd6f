//! Delta encoding of alignment paths.
//!
//! A delta script is a list of signed integers, one per indel, in sequence order.
//! * Entry `k` stands for `|k| - 1` aligned columns (match or substitution) followed by one gap column.
//! * `k > 0`: a base of the first sequence against a gap in the second.
//! * `k < 0`: a base of the second sequence against a gap in the first.
//! * Aligned columns after the last entry are not encoded.

use crate::space::EditSpace;

/// Delta scripts for the two halves of an extension.
/// * Buffers keep their capacity across calls.
#[derive(Debug, Clone, Default)]
pub struct DeltaEncoder {
    right: Vec<i32>,
    left: Vec<i32>,
    stack: Vec<i32>,
}

impl DeltaEncoder {
    /// Script of the last forward extension.
    pub fn right(&self) -> &[i32] {
        &self.right
    }

    /// Script of the last reverse extension.
    pub fn left(&self) -> &[i32] {
        &self.left
    }

    /// Trace a forward path back from `(e, d)` to the origin and store its script.
    ///
    /// The trace visits indels from the far end back to the start. Each step records the run
    /// that follows an indel, so the script is reversed and every magnitude paired with the sign
    /// of the indel before it.
    ///
    /// # Arguments
    /// * `t_consumed`: Bases of the second sequence covered by the path.
    /// * `t_len`: Length of the second sequence.
    ///
    /// # Returns
    /// * `t_consumed`, adjusted if a gap at the outer end was turned into a substitution.
    pub fn set_right(
        &mut self,
        space: &EditSpace,
        e: i32,
        d: i32,
        t_consumed: i32,
        t_len: i32,
    ) -> i32 {
        let mut d = d;
        let mut last = space[(e, d)];

        self.stack.clear();
        for k in (1..=e).rev() {
            let (from, max) = space.predecessor(k, d);
            if from == d - 1 {
                self.stack.push(max - last - 1);
                d -= 1;
                last = space[(k - 1, d)];
            } else if from == d + 1 {
                self.stack.push(last - (max - 1));
                d += 1;
                last = space[(k - 1, d)];
            }
        }
        self.stack.push(last + 1);

        self.right.clear();
        self.right.extend(
            self.stack
                .windows(2)
                .rev()
                .map(|pair| pair[1].abs() * pair[0].signum()),
        );

        // A gap in the second sequence as the very last column: take one more base of it
        // and call the column a substitution.
        if self.stack.len() > 1 && self.stack[0] == 1 && t_consumed < t_len {
            self.right.pop();
            return t_consumed + 1;
        }
        t_consumed
    }

    /// Trace a reverse path back from `(e, d)` to the origin and store its script.
    ///
    /// The trace of a reverse extension runs from the outer end towards the seed, which is
    /// already sequence order.
    ///
    /// # Arguments
    /// * `t_consumed`: Bases of the second sequence covered by the path.
    /// * `t_len`: Length of the second sequence.
    ///
    /// # Returns
    /// * `(leftover, t_consumed)`
    ///     * `leftover`: aligned columns between the last indel and the seed. Not in the script.
    ///     * `t_consumed`: adjusted if a gap at the outer end was turned into a substitution.
    pub fn set_left(
        &mut self,
        space: &EditSpace,
        e: i32,
        d: i32,
        t_consumed: i32,
        t_len: i32,
    ) -> (i32, i32) {
        let mut d = d;
        let mut last = space[(e, d)];
        let mut t_consumed = t_consumed;

        self.left.clear();
        for k in (1..=e).rev() {
            let (from, max) = space.predecessor(k, d);
            if from == d - 1 {
                self.left.push(max - last - 1);
                d -= 1;
                last = space[(k - 1, d)];
            } else if from == d + 1 {
                self.left.push(last - (max - 1));
                d += 1;
                last = space[(k - 1, d)];
            }
        }
        let mut leftover = last;

        // A gap in the second sequence as the very first column: take one more base of it
        // and call the column a substitution.
        if self.left.first() == Some(&1) && t_consumed < t_len {
            if self.left.len() > 1 {
                let next = self.left.remove(1);
                self.left[0] = if next > 0 { next + 1 } else { next - 1 };
            } else {
                self.left.clear();
                leftover += 1;
            }
            t_consumed += 1;
        }

        (leftover, t_consumed)
    }

    /// Flip the sign convention of the forward script, for extensions run with swapped sequences.
    pub fn negate_right(&mut self) {
        self.right.iter_mut().for_each(|delta| *delta = -*delta);
    }

    /// Flip the sign convention of the reverse script.
    pub fn negate_left(&mut self) {
        self.left.iter_mut().for_each(|delta| *delta = -*delta);
    }

    /// Forget the forward script.
    pub fn clear_right(&mut self) {
        self.right.clear();
    }

    /// Forget the reverse script.
    pub fn clear_left(&mut self) {
        self.left.clear();
    }
}

/// Join the two halves of a seeded alignment into one script.
///
/// The unencoded run closing the left script, the seed itself and the run opening the right
/// script are one stretch of aligned columns, so they merge into the first right entry.
///
/// # Arguments
/// * `left`: Script of the reverse extension.
/// * `leftover`: Aligned columns after the last left entry.
/// * `seed_len`: Length of the exact match.
/// * `right`: Script of the forward extension.
///
/// # Examples
/// ```
/// use rs_prefix_edit::delta::splice;
///
/// assert_eq!(splice(&[3, -2], 4, 10, &[5, 7]), vec![3, -2, 19, 7]);
/// assert_eq!(splice(&[3], 4, 10, &[-5]), vec![3, -19]);
/// assert_eq!(splice(&[3], 4, 10, &[]), vec![3]);
/// ```
pub fn splice(left: &[i32], leftover: i32, seed_len: i32, right: &[i32]) -> Vec<i32> {
    let mut delta = Vec::with_capacity(left.len() + right.len());
    delta.extend_from_slice(left);

    if let Some((first, rest)) = right.split_first() {
        let run = leftover + seed_len;
        delta.push(if *first > 0 { first + run } else { first - run });
        delta.extend_from_slice(rest);
    }
    delta
}
