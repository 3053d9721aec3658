// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Maps a span to the logical node (service and instance) it ran on.
//!
//! Each rule is a resolver returning `Option<&str>`. Rules are tried in order and the first
//! match wins; when none match the resolution falls back to a sentinel, so both public
//! functions are total.

use crate::model::{Span, CANONICAL_SERVICE_TAG_KEY, NODE_ID_TAG_KEY};

pub const UNKNOWN: &str = "unknown";

const NODE_ID_SEPARATOR: char = '~';
const NODE_ID_POD_INDEX: usize = 2;
const OPERATION_SERVICE_SEPARATOR: char = ':';

type Resolver = fn(&Span) -> Option<&str>;

const SERVICE_RESOLVERS: &[Resolver] = &[service_from_canonical_tag, service_from_operation];
const INSTANCE_RESOLVERS: &[Resolver] = &[instance_from_node_id];

/// The (service, instance) identity of a span.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogicalNode {
    pub service: String,
    pub instance: String,
}

impl LogicalNode {
    pub fn of(span: &Span) -> Self {
        Self {
            service: resolve_service(span).to_string(),
            instance: resolve_instance(span).to_string(),
        }
    }
}

pub fn resolve_service(span: &Span) -> &str {
    first_match(SERVICE_RESOLVERS, span).unwrap_or(UNKNOWN)
}

pub fn resolve_instance(span: &Span) -> &str {
    first_match(INSTANCE_RESOLVERS, span).unwrap_or(UNKNOWN)
}

fn first_match<'a>(resolvers: &[Resolver], span: &'a Span) -> Option<&'a str> {
    resolvers.iter().find_map(|resolve| resolve(span))
}

/// Value of the first tag named `key`. Later tags with the same key are never consulted.
fn first_tag_value<'a>(span: &'a Span, key: &str) -> Option<&'a str> {
    span.tags
        .iter()
        .find(|tag| tag.key == key)
        .map(|tag| tag.value.as_str())
}

fn service_from_canonical_tag(span: &Span) -> Option<&str> {
    first_tag_value(span, CANONICAL_SERVICE_TAG_KEY)
}

// Always matches, so the service chain never reaches its sentinel.
fn service_from_operation(span: &Span) -> Option<&str> {
    span.operation_name
        .split(OPERATION_SERVICE_SEPARATOR)
        .next()
}

fn instance_from_node_id(span: &Span) -> Option<&str> {
    first_tag_value(span, NODE_ID_TAG_KEY)?
        .split(NODE_ID_SEPARATOR)
        .nth(NODE_ID_POD_INDEX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tag;
    use duplicate::duplicate_item;

    fn span(operation_name: &str, tags: &[(&str, &str)]) -> Span {
        Span {
            operation_name: operation_name.to_string(),
            tags: tags.iter().map(|(k, v)| Tag::new(k, v)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_canonical_service_tag_wins_over_operation_name() {
        let span = span(
            "checkout:GetCart",
            &[("component", "proxy"), ("istio.canonical_service", "X")],
        );
        assert_eq!(resolve_service(&span), "X");
    }

    #[test]
    fn test_first_canonical_service_tag_wins() {
        let span = span(
            "op",
            &[
                ("istio.canonical_service", "first"),
                ("istio.canonical_service", "second"),
            ],
        );
        assert_eq!(resolve_service(&span), "first");
    }

    #[duplicate_item(
        test_name                             operation                   expected;
        [test_service_before_first_colon]     ["checkout:GetCart"]        ["checkout"];
        [test_service_without_colon]          ["noop"]                    ["noop"];
        [test_service_with_many_colons]       ["a:b:c"]                   ["a"];
        [test_service_leading_colon]          [":GetCart"]                [""];
        [test_service_empty_operation]        [""]                        [""];
    )]
    #[test]
    fn test_name() {
        assert_eq!(resolve_service(&span(operation, &[])), expected);
    }

    #[duplicate_item(
        test_name                             node_id                                 expected;
        [test_instance_from_node_id]          ["a~10.0.0.1~pod-xyz~cluster"]          ["pod-xyz"];
        [test_instance_exactly_three_parts]   ["a~b~c"]                               ["c"];
        [test_instance_empty_third_part]      ["a~b~"]                                [""];
        [test_instance_two_parts]             ["a~b"]                                 ["unknown"];
        [test_instance_no_separator]          ["sidecar"]                             ["unknown"];
    )]
    #[test]
    fn test_name() {
        assert_eq!(
            resolve_instance(&span("op", &[("node_id", node_id)])),
            expected
        );
    }

    #[test]
    fn test_instance_without_node_id_tag() {
        assert_eq!(resolve_instance(&span("op", &[])), UNKNOWN);
        assert_eq!(
            resolve_instance(&span("op", &[("nodeid", "a~b~c")])),
            UNKNOWN
        );
    }

    #[test]
    fn test_first_node_id_tag_wins_even_when_malformed() {
        let span = span("op", &[("node_id", "short"), ("node_id", "a~b~pod-c")]);
        assert_eq!(resolve_instance(&span), UNKNOWN);
    }

    #[test]
    fn test_logical_node_of() {
        let span = span(
            "frontend:80",
            &[("node_id", "sidecar~10.1.2.3~frontend-7d9f~default")],
        );
        assert_eq!(
            LogicalNode::of(&span),
            LogicalNode {
                service: "frontend".to_string(),
                instance: "frontend-7d9f".to_string(),
            }
        );
    }
}
