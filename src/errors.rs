use std::io;

use thiserror::Error;

use crate::types::SourceId;

/// Error type for dataset loading, configuration, and IO failures.
///
/// Data-shape mismatches (missing columns, empty filter results, absent
/// metrics) are deliberately *not* errors; they degrade to sentinels so a
/// render pass never aborts on an evolving survey schema.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The source could not be reached or read at all.
    #[error("dataset source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable {
        /// Identifier of the failing source.
        source_id: SourceId,
        /// Human-readable cause.
        reason: String,
    },
    /// The source was readable but its contents could not be interpreted.
    #[error("dataset source '{source_id}' produced malformed data: {details}")]
    Malformed {
        /// Identifier of the failing source.
        source_id: SourceId,
        /// What could not be interpreted.
        details: String,
    },
    /// Underlying IO failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Invalid schema or wiring supplied by the host.
    #[error("configuration error: {0}")]
    Configuration(String),
}
