use serde::Serialize;

use crate::pipeline::stats::student_t_two_sided_p;

/// Fewer complete cases than this and no test is run.
pub const MIN_SAMPLE_SIZE: usize = 3;

/// Standard normal 97.5% quantile, for the 95% Fisher-z interval.
const Z_975: f64 = 1.959_963_984_540_054;

/// Pearson product-moment correlation test result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PearsonTest {
    /// Number of complete cases.
    pub n: usize,
    pub coefficient: f64,
    pub t_statistic: f64,
    pub df: usize,
    /// Two-sided p-value.
    pub p_value: f64,
    /// 95% confidence interval; only defined for n > 3.
    pub ci_low: Option<f64>,
    pub ci_high: Option<f64>,
}

/// Outcome of the correlation stage. Degenerate inputs are reported, never computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationOutcome {
    Estimate(PearsonTest),
    /// Below [`MIN_SAMPLE_SIZE`] complete cases.
    InsufficientData { n: usize },
    /// One of the series is constant over the complete cases.
    ZeroVariance { n: usize },
}

impl CorrelationOutcome {
    #[inline]
    pub fn estimate(&self) -> Option<&PearsonTest> {
        match self {
            Self::Estimate(test) => Some(test),
            _ => None,
        }
    }
}

impl std::fmt::Display for CorrelationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Estimate(test) => {
                write!(f, "r = {:.4}, t = {:.4}, df = {}, p = {:.3e}", test.coefficient, test.t_statistic, test.df, test.p_value)?;
                if let (Some(lo), Some(hi)) = (test.ci_low, test.ci_high) {
                    write!(f, ", 95% CI [{lo:.4}, {hi:.4}]")?;
                }
                write!(f, " (n = {})", test.n)
            }
            Self::InsufficientData { n } => {
                write!(f, "not computed: {n} complete cases, need at least {MIN_SAMPLE_SIZE}")
            }
            Self::ZeroVariance { n } => write!(f, "not computed: constant series over {n} complete cases"),
        }
    }
}

/// Pearson correlation between two columns, dropping rows where either value is missing.
///
/// `x` and `y` are paired by position and must have the same length.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> CorrelationOutcome {
    debug_assert_eq!(x.len(), y.len(), "pearson: columns differ in length");
    let (xs, ys): (Vec<f64>, Vec<f64>) = x.iter().zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .unzip();

    let n = xs.len();
    if n < MIN_SAMPLE_SIZE { return CorrelationOutcome::InsufficientData { n } }

    let mean = |v: &[f64]| v.iter().sum::<f64>() / n as f64;
    let (mx, my) = (mean(&xs), mean(&ys));

    let (sxy, sxx, syy) = xs.iter().zip(&ys)
        .fold((0.0, 0.0, 0.0), |(sxy, sxx, syy), (a, b)| {
            let (dx, dy) = (a - mx, b - my);
            (sxy + dx * dy, sxx + dx * dx, syy + dy * dy)
        });
    if sxx == 0.0 || syy == 0.0 { return CorrelationOutcome::ZeroVariance { n } }

    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    let df = n - 2;
    let t = r * (df as f64 / (1.0 - r * r)).sqrt();
    let p_value = student_t_two_sided_p(t, df as f64);

    let (ci_low, ci_high) = if n > 3 {
        let z = r.atanh();
        let se = 1.0 / ((n - 3) as f64).sqrt();
        (Some((z - Z_975 * se).tanh()), Some((z + Z_975 * se).tanh()))
    } else {
        (None, None)
    };

    CorrelationOutcome::Estimate(PearsonTest { n, coefficient: r, t_statistic: t, df, p_value, ci_low, ci_high })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(v: &[f64]) -> Vec<Option<f64>> { v.iter().copied().map(Some).collect() }

    #[test]
    fn four_points_known_values() {
        let outcome = pearson(&some(&[1.0, 2.0, 3.0, 4.0]), &some(&[1.0, 3.0, 2.0, 4.0]));
        let test = outcome.estimate().unwrap();
        assert_eq!(test.n, 4);
        assert!((test.coefficient - 0.8).abs() < 1e-12);
        // With df = 2 the two-sided p-value reduces to 1 - |r|.
        assert!((test.p_value - 0.2).abs() < 1e-10);
        assert!((test.ci_low.unwrap() - -0.696_953_445_299_322_5).abs() < 1e-12);
        assert!((test.ci_high.unwrap() - 0.995_600_250_466_585_6).abs() < 1e-12);
    }

    #[test]
    fn three_points_have_p_value_but_no_interval() {
        let outcome = pearson(&some(&[1.0, 2.0, 3.0]), &some(&[1.0, 3.0, 2.0]));
        let test = outcome.estimate().unwrap();
        assert!((test.coefficient - 0.5).abs() < 1e-12);
        // df = 1, t = 1/sqrt(3): Cauchy tail gives 2/3.
        assert!((test.p_value - 2.0 / 3.0).abs() < 1e-10);
        assert_eq!((test.ci_low, test.ci_high), (None, None));
    }

    #[test]
    fn missing_rows_are_dropped_not_zeroed() {
        let x = vec![Some(1.0), None, Some(2.0), Some(3.0), Some(4.0)];
        let y = vec![Some(1.0), Some(100.0), Some(3.0), None, Some(4.0)];
        // Complete cases: (1,1), (2,3), (4,4).
        let full = pearson(&x, &y);
        let manual = pearson(&some(&[1.0, 2.0, 4.0]), &some(&[1.0, 3.0, 4.0]));
        assert_eq!(full, manual);
    }

    #[test]
    fn degenerate_inputs_are_flagged() {
        assert_eq!(pearson(&some(&[0.1, 0.4]), &some(&[0.4, 0.9])), CorrelationOutcome::InsufficientData { n: 2 });
        assert_eq!(pearson(&[], &[]), CorrelationOutcome::InsufficientData { n: 0 });
        assert_eq!(
            pearson(&some(&[1.0, 2.0, 3.0, 4.0]), &some(&[5.0, 5.0, 5.0, 5.0])),
            CorrelationOutcome::ZeroVariance { n: 4 },
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "differ in length")]
    fn mismatched_columns_are_rejected() {
        pearson(&some(&[1.0, 2.0, 3.0, 4.0]), &some(&[1.0, 2.0, 3.0]));
    }

    #[test]
    fn perfect_correlation_has_zero_p_value() {
        let test = *pearson(&some(&[1.0, 2.0, 3.0, 4.0, 5.0]), &some(&[-2.0, -4.0, -6.0, -8.0, -10.0]))
            .estimate().unwrap();
        assert_eq!(test.coefficient, -1.0);
        assert_eq!(test.p_value, 0.0);
        assert_eq!((test.ci_low, test.ci_high), (Some(-1.0), Some(-1.0)));
    }

    #[test]
    fn result_is_deterministic() {
        let x = some(&[0.12, 0.55, 0.71, 0.33, 0.90, 0.48, 0.62]);
        let y = some(&[0.020, 0.004, 0.001, 0.013, 0.0005, 0.009, 0.002]);
        let a = pearson(&x, &y).estimate().copied().unwrap();
        let b = pearson(&x, &y).estimate().copied().unwrap();
        assert_eq!(a.coefficient.to_bits(), b.coefficient.to_bits());
        assert_eq!(a.p_value.to_bits(), b.p_value.to_bits());
        assert_eq!(a.ci_low.map(f64::to_bits), b.ci_low.map(f64::to_bits));
        assert!(a.coefficient < 0.0);
    }
}
