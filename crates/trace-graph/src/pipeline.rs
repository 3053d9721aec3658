// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Ingestion, reduction and emission wired together.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::aggregate::CallGraph;
use crate::allow_list::AllowList;
use crate::config::Config;
use crate::error::{GraphError, NoGraph};
use crate::graph::GraphDocument;
use crate::ingest;
use crate::model::InputDocument;
use crate::reducer;

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Written(GraphDocument),
    Skipped(NoGraph),
}

/// Runs ingestion and reduction over an already loaded document.
pub fn build_graph(
    document: Option<InputDocument>,
    allow_list: &AllowList,
) -> Result<GraphDocument, NoGraph> {
    let traces = ingest::ingest(document)?;
    Ok(reducer::reduce(&traces, allow_list))
}

/// Reads the configured trace export and writes the graph document(s).
///
/// A missing input file or an export without traces is reported as
/// [`ExportOutcome::Skipped`] and leaves the outputs untouched.
pub async fn export(config: &Config) -> Result<ExportOutcome, GraphError> {
    let Some(document) = read_document(&config.input_path).await? else {
        warn!(
            "Trace document {} not found, no graph produced",
            config.input_path.display()
        );
        return Ok(ExportOutcome::Skipped(NoGraph::MissingInput));
    };

    let traces = match ingest::ingest(document) {
        Ok(traces) => traces,
        Err(no_graph) => {
            info!("{no_graph}, no graph produced");
            return Ok(ExportOutcome::Skipped(no_graph));
        }
    };

    let graph = reducer::reduce(&traces, &config.allow_list);
    write_document(&config.output_path, &graph).await?;
    info!(
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        "Graph data saved to {}",
        config.output_path.display()
    );

    if let Some(path) = &config.aggregate_output_path {
        let aggregated = CallGraph::build(&traces).instance_document(&config.allow_list);
        write_document(path, &aggregated).await?;
        info!(
            nodes = aggregated.nodes.len(),
            links = aggregated.links.len(),
            "Aggregated graph data saved to {}",
            path.display()
        );
    }

    Ok(ExportOutcome::Written(graph))
}

/// `Ok(None)` when the file does not exist. A file holding `null` reads as `Ok(Some(None))`.
async fn read_document(path: &Path) -> Result<Option<Option<InputDocument>>, GraphError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(GraphError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    ingest::parse_document(&bytes).map(Some)
}

async fn write_document(path: &Path, document: &GraphDocument) -> Result<(), GraphError> {
    let json = document
        .to_json_pretty()
        .map_err(|source| GraphError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| GraphError::Write {
            path: path.to_path_buf(),
            source,
        })
}
