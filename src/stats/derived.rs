//! Ratio metrics computed from already aggregated totals.

use crate::types::{Metric, StatBundle};

/// A derived metric: its key and a pure function over the bundle.
pub struct DerivedMetric {
    pub metric: Metric,
    pub compute: fn(&StatBundle) -> f64,
}

pub const DERIVED_METRICS: &[DerivedMetric] = &[DerivedMetric {
    metric: Metric::GoalsAssistsPer90,
    compute: goals_assists_per90,
}];

pub fn is_derived(metric: Metric) -> bool {
    DERIVED_METRICS.iter().any(|d| d.metric == metric)
}

/// Insert every derived metric into the bundle.
pub fn apply(bundle: &mut StatBundle) {
    for derived in DERIVED_METRICS {
        let value = (derived.compute)(bundle);
        bundle.insert(derived.metric, value);
    }
}

/// `numerator / denominator * 90`, or 0.0 unless minutes are positive.
pub fn per90(numerator: f64, minutes: f64) -> f64 {
    if minutes > 0.0 {
        numerator / minutes * 90.0
    } else {
        0.0
    }
}

pub fn goals_assists_per90(bundle: &StatBundle) -> f64 {
    per90(
        bundle.get(Metric::Goals) + bundle.get(Metric::Assists),
        bundle.get(Metric::Minutes),
    )
}
