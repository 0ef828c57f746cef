// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 telemetry-stats contributors. All rights reserved.

pub mod aggregate;
pub mod api;
pub mod dataset;
pub mod error;

pub use aggregate::{compute, percentile, AnalyticsRequest, AnalyticsResult};
pub use dataset::{load, load_or_empty, Dataset, LoadPolicy, TelemetryRecord};
pub use error::LoadError;
