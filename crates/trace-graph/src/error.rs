// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Failures at the boundary of the pipeline. Trace content never produces one of these.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed trace document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode graph document for {path}: {source}")]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The pipeline ran but had nothing to draw. This is the normal state of a tracing pipeline
/// that has not received data yet, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NoGraph {
    #[error("No trace document available")]
    MissingInput,

    #[error("Trace document contains no traces")]
    NoTraces,
}
