// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Folds traces into an instance level call graph.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::allow_list::AllowList;
use crate::graph::{GraphBuilder, GraphDocument, GraphLink};
use crate::identity::LogicalNode;
use crate::model::{Span, Trace};

pub(crate) const MICROS_PER_MILLI: f64 = 1000.0;

pub fn duration_to_millis(duration_us: u64) -> f64 {
    duration_us as f64 / MICROS_PER_MILLI
}

/// Builds one node per allowed instance and one link per `CHILD_OF` reference between two
/// allowed spans of the same trace.
///
/// Links are deliberately not deduplicated: a pair of instances called N times yields N links,
/// and the renderer relies on that multiplicity.
pub fn reduce(traces: &[Trace], allow_list: &AllowList) -> GraphDocument {
    let mut builder = GraphBuilder::new();
    for trace in traces {
        reduce_trace(trace, allow_list, &mut builder);
    }
    debug!(
        traces = traces.len(),
        nodes = builder.node_count(),
        links = builder.link_count(),
        "Reduced traces to call graph"
    );
    builder.finish()
}

fn reduce_trace(trace: &Trace, allow_list: &AllowList, builder: &mut GraphBuilder) {
    // span ids are only unique within a trace
    let spans_by_id: HashMap<&str, &Span> = trace
        .spans
        .iter()
        .map(|span| (span.span_id.as_str(), span))
        .collect();

    for span in &trace.spans {
        let child = LogicalNode::of(span);
        if !allow_list.contains(&child.service) {
            continue;
        }
        builder.add_node(&child.instance, &child.service);

        for parent_id in span.child_of_ids() {
            let Some(parent_span) = spans_by_id.get(parent_id) else {
                trace!(
                    trace_id = trace.trace_id.as_str(),
                    span_id = span.span_id.as_str(),
                    parent_id,
                    "Ignoring reference to a span outside the trace"
                );
                continue;
            };
            let parent = LogicalNode::of(parent_span);
            if !allow_list.contains(&parent.service) {
                continue;
            }
            builder.add_link(GraphLink {
                source: parent.instance,
                target: child.instance.clone(),
                value: duration_to_millis(span.duration),
                label: None,
            });
        }
    }
}
