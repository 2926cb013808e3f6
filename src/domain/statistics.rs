//! Ranking statistics: percentile rank, OLS regression slope, trailing SMA.
//!
//! All functions are pure and total: degenerate inputs produce 0 rather than
//! NaN so that callers never have to special-case empty or flat series.

/// How equal values share a position when computing percentile ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Every duplicate takes the position of the first equal value in the
    /// ascending sort. Later duplicates are under-ranked.
    #[default]
    FirstOccurrence,
    /// Every duplicate takes the mean of the first and last equal positions.
    Average,
}

impl TieBreak {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "first" | "first_occurrence" => Some(TieBreak::FirstOccurrence),
            "average" | "avg" => Some(TieBreak::Average),
            _ => None,
        }
    }
}

/// Percentile rank of each value within the finite subset of `values`,
/// using [`TieBreak::FirstOccurrence`].
pub fn percentile_rank(values: &[f64]) -> Vec<f64> {
    percentile_rank_with(values, TieBreak::FirstOccurrence)
}

/// Percentile rank of each value within the finite subset of `values`.
///
/// - Non-finite inputs rank 0 and are excluded from the population.
/// - No finite inputs: every output is 0.
/// - One finite input: it ranks 0.5.
/// - Otherwise `position / (finite_count - 1)`, position per `tie_break`.
pub fn percentile_rank_with(values: &[f64], tie_break: TieBreak) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return vec![0.0; values.len()];
    }
    sorted.sort_by(f64::total_cmp);

    let last = (sorted.len() - 1) as f64;
    values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                return 0.0;
            }
            if sorted.len() == 1 {
                return 0.5;
            }
            let first = sorted.partition_point(|&x| x < v);
            let position = match tie_break {
                TieBreak::FirstOccurrence => first as f64,
                TieBreak::Average => {
                    let end = sorted.partition_point(|&x| x <= v);
                    (first + end - 1) as f64 / 2.0
                }
            };
            position / last
        })
        .collect()
}

/// Ordinary least squares slope of `series[i]` against x = 1..=n.
pub fn regression_slope(series: &[f64]) -> f64 {
    let n = series.len();
    if n <= 1 {
        return 0.0;
    }

    let n_f = n as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    for (i, &y) in series.iter().enumerate() {
        let x = (i + 1) as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denominator = n_f * sum_x2 - sum_x * sum_x;
    if denominator.abs() < f64::EPSILON {
        return 0.0;
    }

    let slope = (n_f * sum_xy - sum_x * sum_y) / denominator;
    if slope.is_finite() { slope } else { 0.0 }
}

/// The last `n` values of `series`, or all of it when shorter.
pub fn trailing(series: &[f64], n: usize) -> &[f64] {
    &series[series.len().saturating_sub(n)..]
}

/// Mean of the trailing `n` values. Empty windows average to 0.
pub fn simple_moving_average(series: &[f64], n: usize) -> f64 {
    let window = trailing(series, n);
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<f64>() / window.len() as f64
}
