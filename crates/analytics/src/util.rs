//! Small numeric helpers shared by the analyzers.

/// `numerator / denominator`, or 0 when the denominator is not positive.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// A share expressed as a percentage, clamped into `[0, 100]`.
pub fn percent(numerator: f64, denominator: f64) -> f64 {
    (ratio(numerator, denominator) * 100.0).clamp(0.0, 100.0)
}

/// Sum that saturates at `f64::MAX` rather than overflowing to infinity, so totals
/// always serialize as numbers.
pub fn saturating_sum<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values
        .into_iter()
        .fold(0.0, |acc, v| (acc + v).clamp(-f64::MAX, f64::MAX))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean, `None` for an empty input.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Formats a number with no decimals and comma thousands separators, e.g. `1,234,567`.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_denominator_is_zero() {
        assert_eq!(ratio(5.0, 0.0), 0.0);
        assert_eq!(percent(5.0, 0.0), 0.0);
        assert_eq!(ratio(5.0, -1.0), 0.0);
    }

    #[test]
    fn test_percent_is_clamped() {
        assert_eq!(percent(120.0, 100.0), 100.0);
        assert_eq!(percent(-3.0, 100.0), 0.0);
        assert_close(percent(1.0, 3.0), 33.333333333);
    }

    #[test]
    fn test_saturating_sum() {
        assert_eq!(saturating_sum([1.0, 2.5]), 3.5);
        assert_eq!(saturating_sum(Vec::<f64>::new()), 0.0);
        let huge = saturating_sum([1e308, 1e308, 1e308]);
        assert_eq!(huge, f64::MAX);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert_eq!(mean([2.0, 4.0, 9.0]), Some(5.0));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(43.3333333), 43.33);
        assert_eq!(round2(12.5), 12.5);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(150_000_000.0), "150,000,000");
        assert_eq!(format_thousands(-1234567.0), "-1,234,567");
    }
}
