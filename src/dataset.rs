// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 telemetry-stats contributors. All rights reserved.

use crate::error::LoadError;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub region: String,
    /// Milliseconds.
    pub latency: f64,
    pub uptime: f64,
}

impl TelemetryRecord {
    fn validate(&self) -> Result<(), String> {
        if self.latency < 0.0 {
            return Err(format!("latency must be non-negative, got {}", self.latency));
        }
        Ok(())
    }
}

/// What to do with a record that fails to deserialize or validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Skip it and log a warning.
    #[default]
    Lenient,
    /// Abort the load.
    Strict,
}

/// Read-only telemetry loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<TelemetryRecord>,
}

impl Dataset {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Parse a JSON array of records.
    pub fn from_json(text: &str, policy: LoadPolicy) -> Result<Self, LoadError> {
        let raw: Vec<Value> = serde_json::from_str(text)?;
        let mut records = Vec::with_capacity(raw.len());
        let mut skipped = 0usize;

        for (index, value) in raw.into_iter().enumerate() {
            let parsed = serde_json::from_value::<TelemetryRecord>(value)
                .map_err(|e| e.to_string())
                .and_then(|r| r.validate().map(|_| r));
            match parsed {
                Ok(record) => records.push(record),
                Err(reason) if policy == LoadPolicy::Strict => {
                    return Err(LoadError::InvalidRecord { index, reason });
                }
                Err(reason) => {
                    warn!(index, %reason, "skipping malformed telemetry record");
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            warn!(skipped, kept = records.len(), "telemetry loaded with skipped records");
        }
        Ok(Self { records })
    }
}

impl From<Vec<TelemetryRecord>> for Dataset {
    fn from(records: Vec<TelemetryRecord>) -> Self {
        Self { records }
    }
}

pub fn load(path: &Path, policy: LoadPolicy) -> Result<Dataset, LoadError> {
    let text = std::fs::read_to_string(path)?;
    Dataset::from_json(&text, policy)
}

/// Like [`load`], but an unreadable or unparsable file yields an empty dataset.
/// Only a strict-mode record failure is returned as an error.
pub fn load_or_empty(path: &Path, policy: LoadPolicy) -> Result<Dataset, LoadError> {
    match load(path, policy) {
        Ok(dataset) => {
            info!(path = %path.display(), records = dataset.len(), "telemetry loaded");
            Ok(dataset)
        }
        Err(e @ LoadError::InvalidRecord { .. }) => Err(e),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "telemetry unavailable, serving empty dataset");
            Ok(Dataset::empty())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GOOD: &str = r#"[
        {"region": "us", "latency": 100, "uptime": 0.99},
        {"region": "us", "latency": 200.5, "uptime": 0.95},
        {"region": "eu", "latency": 50, "uptime": 0.999, "host": "eu-1"}
    ]"#;

    const MIXED: &str = r#"[
        {"region": "us", "latency": 100, "uptime": 0.99},
        {"region": "us", "uptime": 0.95},
        {"region": "eu", "latency": "fast", "uptime": 0.9},
        {"region": "eu", "latency": -3, "uptime": 0.9},
        {"latency": 10, "uptime": 0.9},
        {"region": "ap", "latency": 75, "uptime": 0.98}
    ]"#;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_well_formed_records() {
        let dataset = Dataset::from_json(GOOD, LoadPolicy::Strict).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(
            dataset.records()[1],
            TelemetryRecord {
                region: "us".into(),
                latency: 200.5,
                uptime: 0.95,
            }
        );
    }

    #[test]
    fn lenient_skips_malformed_records() {
        let dataset = Dataset::from_json(MIXED, LoadPolicy::Lenient).unwrap();
        let regions: Vec<&str> = dataset.records().iter().map(|r| r.region.as_str()).collect();
        assert_eq!(regions, vec!["us", "ap"]);
    }

    #[test]
    fn strict_rejects_first_malformed_record() {
        match Dataset::from_json(MIXED, LoadPolicy::Strict) {
            Err(LoadError::InvalidRecord { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn non_array_is_parse_error() {
        let err = Dataset::from_json(r#"{"region": "us"}"#, LoadPolicy::Lenient).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let file = write_temp(GOOD);
        let dataset = load(file.path(), LoadPolicy::Lenient).unwrap();
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.json");
        assert!(matches!(load(&path, LoadPolicy::Strict), Err(LoadError::Io(_))));
        let dataset = load_or_empty(&path, LoadPolicy::Strict).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn garbage_file_degrades_to_empty() {
        let file = write_temp("not json at all");
        let dataset = load_or_empty(file.path(), LoadPolicy::Lenient).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn strict_record_error_is_not_absorbed() {
        let file = write_temp(MIXED);
        let err = load_or_empty(file.path(), LoadPolicy::Strict).unwrap_err();
        assert!(matches!(err, LoadError::InvalidRecord { index: 1, .. }));
    }
}
