// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;
use std::fmt;

pub const DEFAULT_ALLOWED_SERVICES: &[&str] = &["frontend", "cartservice"];

/// The service names eligible for inclusion in the output graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    services: BTreeSet<String>,
}

impl AllowList {
    pub fn new<I, S>(services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            services: services.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a list of service names.
    ///
    /// Whitespace separated names are the standard; comma separated names are accepted too and
    /// the two can be mixed. Empty entries are dropped.
    pub fn from_env_string(env_services: &str) -> Self {
        let normalized = env_services.replace(',', " ");
        Self::new(normalized.split_whitespace())
    }

    pub fn contains(&self, service: &str) -> bool {
        self.services.contains(service)
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.services.iter().map(String::as_str)
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_SERVICES.iter().copied())
    }
}

impl fmt::Display for AllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let services = self.iter().collect::<Vec<_>>();
        write!(f, "{}", services.join(","))
    }
}
