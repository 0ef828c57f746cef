// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 telemetry-stats contributors. All rights reserved.

use crate::dataset::TelemetryRecord;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Quantile reported as `p95_latency`.
pub const P95: f64 = 0.95;

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsRequest {
    pub regions: Vec<String>,
    pub threshold_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AnalyticsResult {
    pub avg_latency: f64,
    pub p95_latency: f64,
    pub avg_uptime: f64,
    pub breaches: u64,
}

impl AnalyticsRequest {
    pub fn evaluate(&self, dataset: &[TelemetryRecord]) -> AnalyticsResult {
        compute(dataset, &self.regions, self.threshold_ms)
    }
}

/// Aggregate the records whose region is in `regions`.
///
/// Duplicate or reordered regions have no effect. When nothing matches (empty
/// dataset, empty region list, or no overlap) every field is zero.
pub fn compute<S: AsRef<str>>(
    dataset: &[TelemetryRecord],
    regions: &[S],
    threshold_ms: f64,
) -> AnalyticsResult {
    let wanted: HashSet<&str> = regions.iter().map(AsRef::as_ref).collect();

    let mut latencies: Vec<f64> = Vec::new();
    // Running means: a plain sum overflows for latencies near f64::MAX.
    let mut avg_latency = 0.0;
    let mut avg_uptime = 0.0;
    let mut breaches: u64 = 0;
    for record in dataset.iter().filter(|r| wanted.contains(r.region.as_str())) {
        latencies.push(record.latency);
        let i = latencies.len() as f64;
        avg_latency += (record.latency - avg_latency) / i;
        avg_uptime += (record.uptime - avg_uptime) / i;
        if record.latency > threshold_ms {
            breaches += 1;
        }
    }

    if latencies.is_empty() {
        return AnalyticsResult::default();
    }

    latencies.sort_unstable_by(f64::total_cmp);

    AnalyticsResult {
        avg_latency,
        p95_latency: percentile(&latencies, P95),
        avg_uptime,
        breaches,
    }
}

/// Linearly interpolated quantile `q` (in `[0, 1]`) of an ascending slice.
/// Returns 0.0 for an empty slice.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let k = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = k.floor();
    let hi = k.ceil();
    if lo == hi {
        return sorted[lo as usize];
    }
    sorted[lo as usize] * (hi - k) + sorted[hi as usize] * (k - lo)
}
