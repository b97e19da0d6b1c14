//! Min / mean / max summary over filtered prices.

use phonespec_shared::PriceSummary;

/// Summarize a non-empty price set. `med_value` is the rounded mean
/// (halves round up).
///
/// Empty input yields the zero-result summary, though callers are expected
/// to short-circuit before getting here (see [`summarize`]).
pub fn aggregate(prices: &[u32]) -> PriceSummary {
    let (Some(&min_value), Some(&max_value)) = (prices.iter().min(), prices.iter().max()) else {
        return PriceSummary::empty();
    };

    let count = prices.len();
    let sum: u64 = prices.iter().map(|&p| u64::from(p)).sum();
    let n = count as u64;
    let mean = (2 * sum + n) / (2 * n);

    PriceSummary {
        min_value,
        med_value: u32::try_from(mean).unwrap_or(max_value),
        max_value,
        count,
    }
}

/// Aggregate, or the zero-result summary when nothing survived filtering.
pub fn summarize(prices: &[u32]) -> PriceSummary {
    if prices.is_empty() {
        tracing::debug!("no prices survived filtering");
        return PriceSummary::empty();
    }
    aggregate(prices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_mean_max() {
        let summary = aggregate(&[1000, 2000, 3000]);
        assert_eq!(
            summary,
            PriceSummary {
                min_value: 1000,
                med_value: 2000,
                max_value: 3000,
                count: 3,
            }
        );
    }

    #[test]
    fn mean_not_median() {
        let summary = aggregate(&[1000, 1000, 4000]);
        assert_eq!(summary.med_value, 2000);
    }

    #[test]
    fn mean_rounds_half_up() {
        assert_eq!(aggregate(&[1000, 1001]).med_value, 1001);
        assert_eq!(aggregate(&[1000, 1000, 1001]).med_value, 1000);
    }

    #[test]
    fn empty_short_circuits() {
        assert_eq!(summarize(&[]), PriceSummary::empty());
        assert!(!summarize(&[]).has_data());
        assert_eq!(summarize(&[4500]).count, 1);
    }
}
