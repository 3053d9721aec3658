// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Wire types for the Jaeger query API trace export.
//!
//! Every span field defaults when missing so that partial or malformed spans degrade to
//! sentinel values during reduction instead of failing the whole document.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Tag key holding the canonical service name injected by the Istio sidecar.
pub const CANONICAL_SERVICE_TAG_KEY: &str = "istio.canonical_service";
/// Tag key holding the Envoy node id, `<type>~<ip>~<pod>.<namespace>~<domain>`.
pub const NODE_ID_TAG_KEY: &str = "node_id";

/// The top level input document.
///
/// The by-id export is a sequence of bundles, the search endpoint returns a single bundle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InputDocument {
    Bundles(Vec<TraceBundle>),
    Bundle(TraceBundle),
}

impl InputDocument {
    pub fn into_bundles(self) -> Vec<TraceBundle> {
        match self {
            InputDocument::Bundles(bundles) => bundles,
            InputDocument::Bundle(bundle) => vec![bundle],
        }
    }
}

/// One response object of the Jaeger query API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Trace>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "traceID", default, deserialize_with = "null_as_default")]
    pub trace_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spans: Vec<Span>,
    /// keyed by the `processID` spans refer to
    #[serde(default, deserialize_with = "null_as_default")]
    pub processes: HashMap<String, Process>,
}

impl Trace {
    /// Service name of the process that reported `span`, when the trace declares one.
    pub fn process_service(&self, span: &Span) -> Option<&str> {
        self.processes
            .get(&span.process_id)
            .map(|process| process.service_name.as_str())
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Process {
    #[serde(rename = "serviceName", default, deserialize_with = "null_as_default")]
    pub service_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "spanID", default, deserialize_with = "null_as_default")]
    pub span_id: String,
    #[serde(rename = "operationName", default, deserialize_with = "null_as_default")]
    pub operation_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub references: Vec<Reference>,
    /// microseconds since the unix epoch
    #[serde(rename = "startTime", default, deserialize_with = "null_as_default")]
    pub start_time: u64,
    /// microseconds
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    #[serde(rename = "processID", default, deserialize_with = "null_as_default")]
    pub process_id: String,
}

impl Span {
    /// Spans this span declares itself a `CHILD_OF`, in declaration order.
    pub fn child_of_ids(&self) -> impl Iterator<Item = &str> {
        self.references
            .iter()
            .filter(|reference| reference.ref_type == RefType::ChildOf)
            .map(|reference| reference.span_id.as_str())
    }

    pub fn end_time(&self) -> u64 {
        self.start_time.saturating_add(self.duration)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "refType", default, deserialize_with = "null_as_default")]
    pub ref_type: RefType,
    #[serde(rename = "spanID", default, deserialize_with = "null_as_default")]
    pub span_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefType {
    ChildOf,
    FollowsFrom,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, deserialize_with = "null_as_default")]
    pub key: String,
    /// Non-string values (`int64`, `bool`, `float64`) are kept as their JSON text.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub value: String,
}

impl Tag {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(value) => value,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
