use anyhow::bail;

/// Errors at or below this count are always worth pursuing.
const ERRORS_FOR_FREE: usize = 1;

/// Probability below which an error count is considered too unlikely for a read prefix.
const EDIT_DIST_PROB_BOUND: f64 = 1e-6;

/// Above this many trials, the binomial tail is approximated.
const MAX_EXACT_BINOMIAL: i32 = 35;

/// Z score at which the normal approximation says the tail is certainly large enough.
const NORMAL_DISTRIB_THOLD: f64 = 3.62;

/// Error limits derived from a maximum error rate.
///
/// * `bounds[i]` is the most errors allowed in an overlap of length `i`.
/// * `match_limit[e]` is the shortest reach worth extending with `e` errors.
#[derive(Debug, Clone)]
pub struct ErrorBound {
    bounds: Vec<i32>,
    match_limit: Vec<i32>,
}

impl ErrorBound {
    /// Build tables for reads up to `max_read_len` bases.
    ///
    /// # Arguments
    /// * `max_erate`: Maximum fraction of errors.
    /// * `max_read_len`: Longest read supported.
    ///
    /// # Examples
    /// ```
    /// use rs_prefix_edit::bound::ErrorBound;
    ///
    /// let bound = ErrorBound::new(0.06, 1010);
    /// assert_eq!(bound.for_len(100).unwrap(), 6);
    /// assert_eq!(bound.max_errors(), 62);
    /// ```
    pub fn new(max_erate: f64, max_read_len: usize) -> Self {
        let bounds = (0..=max_read_len)
            .map(|len| (len as f64 * max_erate + 0.000_000_000_000_1).floor() as i32)
            .collect();

        let max_errors = 1 + (max_erate * max_read_len as f64).ceil() as usize;
        let max_len = max_read_len as i32;

        let mut match_limit = vec![0; max_errors];
        let mut start = 1;
        for e in (ERRORS_FOR_FREE + 1)..max_errors {
            start = binomial_bound((e - ERRORS_FOR_FREE) as i32, max_erate, start, max_len);
            match_limit[e] = start - 1;
        }

        ErrorBound {
            bounds,
            match_limit,
        }
    }

    /// Number of error rows an extension can ever use.
    pub fn max_errors(&self) -> i32 {
        self.match_limit.len() as i32
    }

    /// Longest overlap length covered.
    pub fn max_len(&self) -> usize {
        self.bounds.len() - 1
    }

    /// Most errors allowed in an overlap of `len` bases.
    pub fn for_len(&self, len: usize) -> anyhow::Result<i32> {
        let Some(bound) = self.bounds.get(len) else {
            bail!(
                "Overlap length {len} exceeds maximum read length {}.",
                self.max_len()
            );
        };
        Ok(*bound)
    }

    /// Minimum reach along a diagonal to keep extending with `e` errors.
    #[inline]
    pub fn match_limit(&self, e: i32) -> i32 {
        self.match_limit[e as usize]
    }
}

/// Smallest `n >= start` (and `n >= e`) such that the probability of at least `e` errors in `n`
/// trials with error probability `p` exceeds [`EDIT_DIST_PROB_BOUND`].
///
/// Past [`MAX_EXACT_BINOMIAL`] trials the tail is approximated, and the Poisson form counts more
/// than `e` errors, which asks for a slightly longer `n`.
///
/// Returns `max_len` if there is none below it.
pub fn binomial_bound(e: i32, p: f64, start: i32, max_len: i32) -> i32 {
    let q = 1.0 - p;
    let ln_factorial: f64 = (1..=e + 1).map(|k| f64::from(k).ln()).sum();

    for n in start.max(e)..max_len {
        if n <= MAX_EXACT_BINOMIAL {
            let mut sum = 0.0;
            let mut bin_coeff = 1.0;
            let mut p_power = 1.0;
            let mut q_power = q.powi(n);

            let mut k = 0;
            while k < e && 1.0 - sum > EDIT_DIST_PROB_BOUND {
                sum += bin_coeff * p_power * q_power;
                bin_coeff *= f64::from(n - k);
                bin_coeff /= f64::from(k + 1);
                p_power *= p;
                q_power /= q;
                k += 1;
            }
            if 1.0 - sum > EDIT_DIST_PROB_BOUND {
                return n;
            }
        } else {
            let trials = f64::from(n);
            let normal_z = (f64::from(e) - 0.5 - trials * p) / (trials * p * q).sqrt();
            if normal_z <= NORMAL_DISTRIB_THOLD {
                return n;
            }

            let mu = trials * p;
            if poisson_tail(e + 1, mu, ln_factorial) > EDIT_DIST_PROB_BOUND {
                return n;
            }
        }
    }

    max_len
}

/// `P(X >= e)` for `X ~ Poisson(mu)`, summed upward from `e` in log space.
/// * Only called with `e` well above `mu`, so terms shrink quickly.
fn poisson_tail(e: i32, mu: f64, ln_factorial_e: f64) -> f64 {
    let log_mu = mu.ln();
    let mut log_term = f64::from(e) * log_mu - mu - ln_factorial_e;
    let mut tail = 0.0;
    let mut k = e;
    loop {
        let term = log_term.exp();
        tail += term;
        if term <= tail * 1e-12 || k - e >= 100_000 {
            break;
        }
        k += 1;
        log_term += log_mu - f64::from(k).ln();
    }
    tail
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_bound_values() {
        let bound = ErrorBound::new(0.06, 500);
        assert_eq!(bound.for_len(0).unwrap(), 0);
        assert_eq!(bound.for_len(16).unwrap(), 0);
        assert_eq!(bound.for_len(17).unwrap(), 1);
        assert_eq!(bound.for_len(50).unwrap(), 3);
        assert_eq!(bound.for_len(500).unwrap(), 30);
        assert_eq!(bound.max_len(), 500);
    }

    #[test]
    fn test_error_bound_monotonic() {
        let bound = ErrorBound::new(0.13, 2000);
        for len in 1..=2000 {
            assert!(bound.for_len(len).unwrap() >= bound.for_len(len - 1).unwrap());
        }
    }

    #[test]
    fn test_error_bound_past_max_len() {
        let bound = ErrorBound::new(0.06, 100);
        assert!(bound.for_len(101).is_err());
    }

    #[test]
    fn test_max_errors() {
        assert_eq!(ErrorBound::new(0.0, 1000).max_errors(), 1);
        assert_eq!(ErrorBound::new(0.06, 1010).max_errors(), 62);
        assert_eq!(ErrorBound::new(0.015, 1010).max_errors(), 17);
    }

    #[test]
    fn test_match_limit() {
        let bound = ErrorBound::new(0.06, 4000);
        // Free errors.
        assert_eq!(bound.match_limit(0), 0);
        assert_eq!(bound.match_limit(1), 0);
        // One error is likely in a single base at 6%.
        assert_eq!(bound.match_limit(2), 0);
        // Two errors in two bases: 0.0036.
        assert_eq!(bound.match_limit(3), 1);

        for e in 1..bound.max_errors() {
            assert!(bound.match_limit(e) >= bound.match_limit(e - 1));
        }
        // Around 1 / 0.06 bases per extra error far out.
        let far = bound.match_limit(200);
        assert!(far > 2000 && far < 4000, "{far}");
    }

    #[test]
    fn test_binomial_bound_no_errors_possible() {
        assert_eq!(binomial_bound(3, 0.0, 1, 100), 100);
    }

    #[test]
    fn test_poisson_tail() {
        // P(X >= 1) = 1 - e^-mu.
        let tail = poisson_tail(1, 0.5, 0.0);
        assert!((tail - (1.0 - (-0.5f64).exp())).abs() < 1e-9, "{tail}");
        // Nothing can happen without a rate.
        assert_eq!(poisson_tail(3, 0.0, 6f64.ln()), 0.0);
    }

    #[test]
    fn test_binomial_bound_poisson_region() {
        // Counting `e` or more errors would stop at 37 and 90.
        assert_eq!(binomial_bound(8, 0.02, 1, 4000), 50);
        assert_eq!(binomial_bound(20, 0.06, 1, 4000), 98);
        // Exact sums are untouched.
        assert_eq!(binomial_bound(6, 0.02, 1, 4000), 19);
    }

    #[test]
    fn test_binomial_bound_start() {
        // Never below the number of errors or the given start.
        assert_eq!(binomial_bound(5, 0.5, 1, 1000), 5);
        assert_eq!(binomial_bound(1, 0.5, 40, 1000), 40);
    }
}
