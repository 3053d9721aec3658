// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The graph document handed to the rendering layer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    /// milliseconds
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// `{ nodes: [...], links: [...] }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl GraphDocument {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Accumulates a `GraphDocument`. Nodes are keyed by name and keep the category they were
/// first registered with; links are appended as given.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    seen: HashSet<String>,
    document: GraphDocument,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when a node with this name already exists.
    pub fn add_node(&mut self, name: &str, category: &str) -> bool {
        if self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_string());
        self.document.nodes.push(GraphNode {
            name: name.to_string(),
            category: category.to_string(),
        });
        true
    }

    pub fn add_link(&mut self, link: GraphLink) {
        self.document.links.push(link);
    }

    pub fn node_count(&self) -> usize {
        self.document.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.document.links.len()
    }

    pub fn finish(self) -> GraphDocument {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_serialization() {
        let document = GraphDocument::default();
        assert!(document.is_empty());
        assert_eq!(
            String::from_utf8(document.to_vec().unwrap()).unwrap(),
            r#"{"nodes":[],"links":[]}"#
        );
    }

    #[test]
    fn test_builder_keeps_first_category() {
        let mut builder = GraphBuilder::new();
        assert!(builder.add_node("pod-a", "frontend"));
        assert!(!builder.add_node("pod-a", "cartservice"));
        assert!(builder.add_node("pod-b", "cartservice"));
        let document = builder.finish();
        assert_eq!(
            document.nodes,
            vec![
                GraphNode {
                    name: "pod-a".to_string(),
                    category: "frontend".to_string(),
                },
                GraphNode {
                    name: "pod-b".to_string(),
                    category: "cartservice".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_link_serialization_omits_missing_label() {
        let link = GraphLink {
            source: "pod-a".to_string(),
            target: "pod-b".to_string(),
            value: 5.0,
            label: None,
        };
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"source": "pod-a", "target": "pod-b", "value": 5.0})
        );
    }
}
