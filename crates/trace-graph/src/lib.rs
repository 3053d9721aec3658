// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Turns a Jaeger trace export into a weighted instance call graph.
//!
//! ```text
//! InputDocument -> ingest -> [Trace] -> reduce(AllowList) -> GraphDocument
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod aggregate;
pub mod allow_list;
pub mod categorize;
pub mod config;
pub mod error;
pub mod format;
pub mod graph;
pub mod identity;
pub mod ingest;
pub mod logger;
pub mod model;
pub mod pipeline;
pub mod reducer;
pub mod summary;

pub use allow_list::AllowList;
pub use error::{GraphError, NoGraph};
pub use graph::{GraphDocument, GraphLink, GraphNode};
pub use pipeline::{build_graph, export, ExportOutcome};
pub use reducer::reduce;
