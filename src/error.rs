// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 telemetry-stats contributors. All rights reserved.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read telemetry file: {0}")]
    Io(#[from] std::io::Error),

    #[error("telemetry file is not a JSON array of records: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid telemetry record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}
