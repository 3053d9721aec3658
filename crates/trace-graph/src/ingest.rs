// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Turns the raw export into a flat, ordered list of traces.

use tracing::debug;

use crate::error::{GraphError, NoGraph};
use crate::model::{InputDocument, Trace, TraceBundle};

/// Flattens bundles into traces, preserving bundle order then trace order. Bundles without a
/// `data` field contribute nothing.
pub fn flatten(bundles: Vec<TraceBundle>) -> Vec<Trace> {
    let bundle_count = bundles.len();
    let traces: Vec<Trace> = bundles
        .into_iter()
        .filter_map(|bundle| bundle.data)
        .flatten()
        .collect();
    debug!(
        bundles = bundle_count,
        traces = traces.len(),
        "Flattened trace bundles"
    );
    traces
}

/// Parses a serialized input document. A JSON `null` is an absent document, not an error.
pub fn parse_document(bytes: &[u8]) -> Result<Option<InputDocument>, GraphError> {
    Ok(serde_json::from_slice::<Option<InputDocument>>(bytes)?)
}

/// Validates presence and content of the document and returns its traces, or the reason there
/// is nothing to draw.
pub fn ingest(document: Option<InputDocument>) -> Result<Vec<Trace>, NoGraph> {
    let document = document.ok_or(NoGraph::MissingInput)?;
    let traces = flatten(document.into_bundles());
    if traces.is_empty() {
        return Err(NoGraph::NoTraces);
    }
    Ok(traces)
}

/// Keeps the traces with at least one span starting inside `[start_us, end_us]`.
pub fn retain_started_within(traces: Vec<Trace>, start_us: u64, end_us: u64) -> Vec<Trace> {
    let window = start_us..=end_us;
    traces
        .into_iter()
        .filter(|trace| {
            trace
                .spans
                .iter()
                .any(|span| window.contains(&span.start_time))
        })
        .collect()
}
