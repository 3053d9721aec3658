// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Groups traces by the set of services they touch.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::identity::resolve_service;
use crate::model::Trace;

/// Sorted, distinct service names.
pub type CategoryKey = BTreeSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraceSample {
    /// start time of the first span, microseconds since the unix epoch
    pub start_time: Option<u64>,
    /// sum of all span durations, microseconds
    pub total_duration: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub services: Vec<String>,
    pub count: usize,
    pub mean_total_duration: f64,
    /// `(total duration, cumulative fraction)` in ascending duration order
    pub cdf: Vec<(u64, f64)>,
}

#[derive(Debug, Default)]
pub struct TraceCategories {
    categories: BTreeMap<CategoryKey, Vec<TraceSample>>,
}

impl TraceCategories {
    pub fn categorize(traces: &[Trace]) -> Self {
        let mut categories = Self::default();
        for trace in traces {
            let key: CategoryKey = trace
                .spans
                .iter()
                .map(|span| resolve_service(span).to_string())
                .collect();
            let sample = TraceSample {
                start_time: trace.spans.first().map(|span| span.start_time),
                total_duration: trace
                    .spans
                    .iter()
                    .fold(0, |total: u64, span| total.saturating_add(span.duration)),
            };
            categories.categories.entry(key).or_default().push(sample);
        }
        categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn samples(&self, key: &CategoryKey) -> Option<&[TraceSample]> {
        self.categories.get(key).map(Vec::as_slice)
    }

    /// Samples of every category ordered by start time; samples without spans sort first.
    pub fn trends(&self) -> impl Iterator<Item = (&CategoryKey, Vec<TraceSample>)> {
        self.categories.iter().map(|(key, samples)| {
            let mut samples = samples.clone();
            samples.sort_by_key(|sample| (sample.start_time, sample.total_duration));
            (key, samples)
        })
    }

    pub fn stats(&self) -> Vec<CategoryStats> {
        self.categories
            .iter()
            .map(|(key, samples)| {
                let mut durations = samples
                    .iter()
                    .map(|sample| sample.total_duration)
                    .collect::<Vec<_>>();
                durations.sort_unstable();
                let count = durations.len();
                let total = durations.iter().map(|d| *d as f64).sum::<f64>();
                CategoryStats {
                    services: key.iter().cloned().collect(),
                    count,
                    mean_total_duration: total / count as f64,
                    cdf: durations
                        .iter()
                        .enumerate()
                        .map(|(i, d)| (*d, (i + 1) as f64 / count as f64))
                        .collect(),
                }
            })
            .collect()
    }
}
