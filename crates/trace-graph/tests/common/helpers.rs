// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Builders for Jaeger-shaped JSON used across the integration tests.

use serde_json::{json, Value};

/// A span as the Istio/Envoy integration reports it.
pub fn istio_span(
    span_id: &str,
    service: &str,
    pod: &str,
    duration: u64,
    parents: &[&str],
) -> Value {
    json!({
        "traceID": "trace",
        "spanID": span_id,
        "operationName": format!("{service}.default.svc.cluster.local:80/*"),
        "references": parents
            .iter()
            .map(|parent| json!({"refType": "CHILD_OF", "traceID": "trace", "spanID": parent}))
            .collect::<Vec<_>>(),
        "startTime": 1_743_300_684_047_152u64,
        "duration": duration,
        "tags": [
            {"key": "component", "type": "string", "value": "proxy"},
            {"key": "istio.canonical_service", "type": "string", "value": service},
            {"key": "node_id", "type": "string", "value": format!("sidecar~10.0.0.1~{pod}~default.svc.cluster.local")},
            {"key": "http.status_code", "type": "string", "value": "200"}
        ],
        "logs": [],
        "processID": "p1",
        "warnings": null
    })
}

pub fn trace(trace_id: &str, spans: Vec<Value>) -> Value {
    json!({
        "traceID": trace_id,
        "spans": spans,
        "processes": {"p1": {"serviceName": "frontend.default", "tags": []}},
        "warnings": null
    })
}

/// One by-id response per trace, as the bulk export stores them.
pub fn export(traces: Vec<Value>) -> Vec<u8> {
    let bundles = traces
        .into_iter()
        .map(|trace| json!({"data": [trace], "total": 0, "limit": 0, "offset": 0, "errors": null}))
        .collect::<Vec<_>>();
    serde_json::to_vec(&bundles).unwrap()
}
