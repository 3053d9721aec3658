// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Aggregated call graphs.
//!
//! Unlike [`crate::reducer::reduce`], repeated calls between the same pair are merged into a
//! single edge carrying every observed duration, at both instance and service granularity.

use std::collections::HashMap;

use crate::allow_list::AllowList;
use crate::format::format_duration;
use crate::graph::{GraphBuilder, GraphDocument, GraphLink};
use crate::identity::LogicalNode;
use crate::model::{Span, Trace};
use crate::reducer::MICROS_PER_MILLI;

/// Every call observed between two instances. The services are those of the first call.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceEdge {
    pub source: String,
    pub target: String,
    pub source_service: String,
    pub target_service: String,
    /// child span durations, microseconds
    pub durations: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEdge {
    pub source: String,
    pub target: String,
    /// child span durations, microseconds
    pub durations: Vec<u64>,
}

impl InstanceEdge {
    pub fn mean_duration_us(&self) -> f64 {
        mean(&self.durations)
    }
}

impl ServiceEdge {
    pub fn mean_duration_us(&self) -> f64 {
        mean(&self.durations)
    }
}

fn mean(durations: &[u64]) -> f64 {
    if durations.is_empty() {
        return 0.0;
    }
    durations.iter().map(|d| *d as f64).sum::<f64>() / durations.len() as f64
}

/// Edges are kept in first-observed order.
#[derive(Debug, Default)]
pub struct CallGraph {
    instance_edges: Vec<InstanceEdge>,
    instance_index: HashMap<(String, String), usize>,
    service_edges: Vec<ServiceEdge>,
    service_index: HashMap<(String, String), usize>,
}

impl CallGraph {
    /// Records every `CHILD_OF` relation between two spans of the same trace, for all services.
    pub fn build(traces: &[Trace]) -> Self {
        let mut graph = Self::default();
        for trace in traces {
            let spans_by_id: HashMap<&str, &Span> = trace
                .spans
                .iter()
                .map(|span| (span.span_id.as_str(), span))
                .collect();
            for span in &trace.spans {
                let child = LogicalNode::of(span);
                for parent_id in span.child_of_ids() {
                    if let Some(parent_span) = spans_by_id.get(parent_id) {
                        graph.record(&LogicalNode::of(parent_span), &child, span.duration);
                    }
                }
            }
        }
        graph
    }

    fn record(&mut self, parent: &LogicalNode, child: &LogicalNode, duration: u64) {
        let key = (parent.instance.clone(), child.instance.clone());
        match self.instance_index.get(&key) {
            Some(&index) => self.instance_edges[index].durations.push(duration),
            None => {
                self.instance_index.insert(key, self.instance_edges.len());
                self.instance_edges.push(InstanceEdge {
                    source: parent.instance.clone(),
                    target: child.instance.clone(),
                    source_service: parent.service.clone(),
                    target_service: child.service.clone(),
                    durations: vec![duration],
                });
            }
        }

        let key = (parent.service.clone(), child.service.clone());
        match self.service_index.get(&key) {
            Some(&index) => self.service_edges[index].durations.push(duration),
            None => {
                self.service_index.insert(key, self.service_edges.len());
                self.service_edges.push(ServiceEdge {
                    source: parent.service.clone(),
                    target: child.service.clone(),
                    durations: vec![duration],
                });
            }
        }
    }

    pub fn instance_edges(&self) -> &[InstanceEdge] {
        &self.instance_edges
    }

    pub fn service_edges(&self) -> &[ServiceEdge] {
        &self.service_edges
    }

    /// Instance edges whose caller and callee services are both allowed.
    pub fn filtered<'a>(
        &'a self,
        allow_list: &'a AllowList,
    ) -> impl Iterator<Item = &'a InstanceEdge> + 'a {
        self.instance_edges.iter().filter(move |edge| {
            allow_list.contains(&edge.source_service) && allow_list.contains(&edge.target_service)
        })
    }

    /// One link per allowed instance pair valued at the mean call duration in milliseconds.
    pub fn instance_document(&self, allow_list: &AllowList) -> GraphDocument {
        let mut builder = GraphBuilder::new();
        for edge in self.filtered(allow_list) {
            builder.add_node(&edge.source, &edge.source_service);
            builder.add_node(&edge.target, &edge.target_service);
            builder.add_link(averaged_link(
                &edge.source,
                &edge.target,
                edge.mean_duration_us(),
            ));
        }
        builder.finish()
    }

    pub fn service_document(&self) -> GraphDocument {
        let mut builder = GraphBuilder::new();
        for edge in &self.service_edges {
            builder.add_node(&edge.source, &edge.source);
            builder.add_node(&edge.target, &edge.target);
            builder.add_link(averaged_link(
                &edge.source,
                &edge.target,
                edge.mean_duration_us(),
            ));
        }
        builder.finish()
    }
}

fn averaged_link(source: &str, target: &str, mean_us: f64) -> GraphLink {
    GraphLink {
        source: source.to_string(),
        target: target.to_string(),
        value: mean_us / MICROS_PER_MILLI,
        label: Some(format_duration(mean_us)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Reference, RefType, Tag};

    fn span(id: &str, service: &str, pod: &str, duration: u64, parent: Option<&str>) -> Span {
        Span {
            span_id: id.to_string(),
            operation_name: format!("{service}:op"),
            duration,
            references: parent
                .map(|parent| Reference {
                    ref_type: RefType::ChildOf,
                    span_id: parent.to_string(),
                })
                .into_iter()
                .collect(),
            tags: vec![Tag::new("node_id", &format!("sidecar~10.0.0.1~{pod}~default"))],
            ..Default::default()
        }
    }

    fn traces() -> Vec<Trace> {
        vec![
            Trace {
                trace_id: "t1".to_string(),
                spans: vec![
                    span("gw", "istio-ingressgateway", "gw-0", 20_000, None),
                    span("f", "frontend", "frontend-0", 10_000, Some("gw")),
                    span("c1", "cartservice", "cart-0", 2_000, Some("f")),
                    span("r", "redis-cart", "redis-0", 500, Some("c1")),
                ],
                ..Default::default()
            },
            Trace {
                trace_id: "t2".to_string(),
                spans: vec![
                    span("f", "frontend", "frontend-0", 10_000, None),
                    span("c1", "cartservice", "cart-0", 4_000, Some("f")),
                    span("c2", "cartservice", "cart-1", 1_000, Some("f")),
                    span("x", "cartservice", "cart-1", 1_000, Some("gone")),
                ],
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_build_merges_repeated_pairs() {
        let graph = CallGraph::build(&traces());
        let edges = graph.instance_edges();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[1].source, "frontend-0");
        assert_eq!(edges[1].target, "cart-0");
        assert_eq!(edges[1].durations, vec![2_000, 4_000]);
        assert_eq!(edges[1].mean_duration_us(), 3_000.0);
    }

    #[test]
    fn test_service_edges() {
        let graph = CallGraph::build(&traces());
        let edges = graph.service_edges();
        assert_eq!(
            edges
                .iter()
                .map(|e| (e.source.as_str(), e.target.as_str(), e.durations.len()))
                .collect::<Vec<_>>(),
            vec![
                ("istio-ingressgateway", "frontend", 1),
                ("frontend", "cartservice", 3),
                ("cartservice", "redis-cart", 1),
            ]
        );
    }

    #[test]
    fn test_instance_document_is_filtered_and_averaged() {
        let graph = CallGraph::build(&traces());
        let document = graph.instance_document(&AllowList::default());
        let links = document
            .links
            .iter()
            .map(|l| (l.source.as_str(), l.target.as_str(), l.value, l.label.as_deref()))
            .collect::<Vec<_>>();
        assert_eq!(
            links,
            vec![
                ("frontend-0", "cart-0", 3.0, Some("3.0ms")),
                ("frontend-0", "cart-1", 1.0, Some("1.0ms")),
            ]
        );
        assert_eq!(
            document
                .nodes
                .iter()
                .map(|n| (n.name.as_str(), n.category.as_str()))
                .collect::<Vec<_>>(),
            vec![
                ("frontend-0", "frontend"),
                ("cart-0", "cartservice"),
                ("cart-1", "cartservice"),
            ]
        );
    }

    #[test]
    fn test_service_document() {
        let graph = CallGraph::build(&traces());
        let document = graph.service_document();
        assert_eq!(document.nodes.len(), 4);
        let frontend_to_cart = &document.links[1];
        assert!((frontend_to_cart.value - 7.0 / 3.0).abs() < 1e-9);
        assert_eq!(frontend_to_cart.label.as_deref(), Some("2.3ms"));
    }

    #[test]
    fn test_empty_graph() {
        let graph = CallGraph::build(&[]);
        assert!(graph.instance_edges().is_empty());
        assert!(graph.instance_document(&AllowList::default()).is_empty());
        assert!(graph.service_document().is_empty());
    }
}
