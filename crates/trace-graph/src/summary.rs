// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-trace shape: timing, the instance walk order and the parent to child hops.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::identity::{resolve_instance, resolve_service};
use crate::model::{Span, Trace};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hop {
    pub from: String,
    pub to: String,
    pub from_service: String,
    pub to_service: String,
    pub from_instance: String,
    pub to_instance: String,
    /// child start minus parent start, microseconds, saturating at the `i64` bounds
    pub latency: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceSummary {
    pub trace_id: String,
    /// earliest span start, microseconds since the unix epoch
    pub start_time: u64,
    /// latest span end minus earliest span start, microseconds
    pub total_duration: u64,
    /// instances in depth-first order from the root spans
    pub instance_sequence: Vec<String>,
    pub hops: Vec<Hop>,
}

impl TraceSummary {
    /// A span's parent is its first reference, of any kind, and only spans without references
    /// are roots. A span whose parent is outside the trace hangs off nothing, so neither it
    /// nor its descendants appear in the instance sequence.
    ///
    /// Services come from the reporting process when the trace declares one, otherwise from
    /// the span's own tags.
    pub fn of(trace: &Trace) -> Self {
        let index_by_id: HashMap<&str, usize> = trace
            .spans
            .iter()
            .enumerate()
            .map(|(index, span)| (span.span_id.as_str(), index))
            .collect();
        let services: Vec<&str> = trace
            .spans
            .iter()
            .map(|span| trace.process_service(span).unwrap_or_else(|| resolve_service(span)))
            .collect();
        let instances: Vec<&str> = trace.spans.iter().map(resolve_instance).collect();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); trace.spans.len()];
        let mut roots = Vec::new();
        for (index, span) in trace.spans.iter().enumerate() {
            let Some(reference) = span.references.first() else {
                roots.push(index);
                continue;
            };
            if let Some(&parent) = index_by_id.get(reference.span_id.as_str()) {
                children[parent].push(index);
            }
        }

        let mut hops = Vec::new();
        for (parent, kids) in children.iter().enumerate() {
            for &child in kids {
                let (parent_span, child_span) = (&trace.spans[parent], &trace.spans[child]);
                hops.push(Hop {
                    from: parent_span.span_id.clone(),
                    to: child_span.span_id.clone(),
                    from_service: services[parent].to_string(),
                    to_service: services[child].to_string(),
                    from_instance: instances[parent].to_string(),
                    to_instance: instances[child].to_string(),
                    latency: latency(parent_span.start_time, child_span.start_time),
                });
            }
        }

        let start_time = trace.spans.iter().map(|s| s.start_time).min().unwrap_or(0);
        let end_time = trace.spans.iter().map(Span::end_time).max().unwrap_or(0);

        Self {
            trace_id: trace.trace_id.clone(),
            start_time,
            total_duration: end_time.saturating_sub(start_time),
            instance_sequence: depth_first(&roots, &children)
                .into_iter()
                .map(|index| instances[index].to_string())
                .collect(),
            hops,
        }
    }
}

fn latency(parent_start: u64, child_start: u64) -> i64 {
    if child_start >= parent_start {
        i64::try_from(child_start - parent_start).unwrap_or(i64::MAX)
    } else {
        i64::try_from(parent_start - child_start).map_or(i64::MIN, |delta| -delta)
    }
}

// Iterative pre-order walk; a span is visited at most once so reference cycles terminate.
fn depth_first(roots: &[usize], children: &[Vec<usize>]) -> Vec<usize> {
    let mut order = Vec::with_capacity(children.len());
    let mut visited = HashSet::new();
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(index) = stack.pop() {
        if !visited.insert(index) {
            continue;
        }
        order.push(index);
        stack.extend(children[index].iter().rev().copied());
    }
    order
}
