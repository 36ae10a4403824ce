//! Numerically stable statistics over `f64` slices.
//!
//! These are the kernels behind [`crate::processing::reduce`] and the aggregation engine.
//! They return `None` when the input is too small for the statistic to be defined;
//! callers turn that into an error or a `Null` cell.
//!
//! Summation uses Kahan's compensated algorithm, bounding rounding error growth to
//! O(1) ulps instead of O(n). Variance and covariance are two-pass: the mean is computed
//! first, then the compensated sum of (products of) deviations.

/// Divisor convention for variance-like statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VarianceKind {
    /// Bessel-corrected sample statistic (divide by `n - 1`).
    #[default]
    Sample,
    /// Population statistic (divide by `n`).
    Population,
}

impl VarianceKind {
    /// Smallest number of values for which the statistic is defined.
    pub fn min_count(self) -> usize {
        match self {
            VarianceKind::Sample => 2,
            VarianceKind::Population => 1,
        }
    }

    fn divisor(self, n: usize) -> f64 {
        match self {
            VarianceKind::Sample => (n - 1) as f64,
            VarianceKind::Population => n as f64,
        }
    }
}

/// Running Kahan-compensated sum.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KahanSum {
    sum: f64,
    // Running compensation for lost low-order bits.
    c: f64,
}

impl KahanSum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64) {
        let y = value - self.c;
        let t = self.sum + y;
        self.c = (t - self.sum) - y;
        self.sum = t;
    }

    /// Fold another partial sum into this one.
    pub fn merge(&mut self, other: &KahanSum) {
        self.add(other.sum);
        self.add(-other.c);
    }

    pub fn total(&self) -> f64 {
        self.sum
    }
}

impl FromIterator<f64> for KahanSum {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = KahanSum::new();
        for v in iter {
            acc.add(v);
        }
        acc
    }
}

/// Compensated sum. `kahan_sum(&[]) == 0.0`.
pub fn kahan_sum(data: &[f64]) -> f64 {
    data.iter().copied().collect::<KahanSum>().total()
}

/// Arithmetic mean (compensated). `None` for empty input.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(kahan_sum(data) / data.len() as f64)
}

/// Two-pass variance. `None` when `data` is shorter than [`VarianceKind::min_count`].
pub fn variance(data: &[f64], kind: VarianceKind) -> Option<f64> {
    if data.len() < kind.min_count() {
        return None;
    }
    let m = mean(data)?;
    let ss: KahanSum = data.iter().map(|x| (x - m) * (x - m)).collect();
    Some(ss.total() / kind.divisor(data.len()))
}

/// Standard deviation: square root of [`variance`].
pub fn std_dev(data: &[f64], kind: VarianceKind) -> Option<f64> {
    variance(data, kind).map(f64::sqrt)
}

/// Two-pass covariance of paired samples.
///
/// `None` if the slices differ in length or are too short for `kind`.
pub fn covariance(xs: &[f64], ys: &[f64], kind: VarianceKind) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < kind.min_count() {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let sp: KahanSum = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).collect();
    Some(sp.total() / kind.divisor(xs.len()))
}

/// Pearson correlation: `cov(x, y) / (sd(x) * sd(y))`.
///
/// `None` if the covariance is undefined or either series has zero spread.
pub fn correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let cov = covariance(xs, ys, VarianceKind::Sample)?;
    let denom = std_dev(xs, VarianceKind::Sample)? * std_dev(ys, VarianceKind::Sample)?;
    if denom == 0.0 {
        return None;
    }
    Some(cov / denom)
}

/// Median of a copy of `data`, sorted with [`f64::total_cmp`]. `None` for empty input.
pub fn median(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}
