// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::PathBuf;

use crate::allow_list::AllowList;
use crate::error::GraphError;

const DEFAULT_INPUT_PATH: &str = "trace_results.json";
const DEFAULT_OUTPUT_PATH: &str = "graph_data.json";
const DEFAULT_LOG_LEVEL: &str = "info";
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone)]
pub struct Config {
    /// services eligible for the graph
    pub allow_list: AllowList,
    /// trace export to read
    pub input_path: PathBuf,
    /// where the per-call graph document is written
    pub output_path: PathBuf,
    /// where the aggregated graph document is written, if anywhere
    pub aggregate_output_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allow_list: AllowList::default(),
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            aggregate_output_path: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Reads the configuration from `TRACE_GRAPH_*` environment variables.
    pub fn new() -> Result<Config, GraphError> {
        let allow_list = env::var("TRACE_GRAPH_ALLOWED_SERVICES")
            .map(|services| AllowList::from_env_string(&services))
            .unwrap_or_default();
        let input_path: PathBuf = env::var("TRACE_GRAPH_INPUT")
            .unwrap_or_else(|_| DEFAULT_INPUT_PATH.to_string())
            .into();
        let output_path: PathBuf = env::var("TRACE_GRAPH_OUTPUT")
            .unwrap_or_else(|_| DEFAULT_OUTPUT_PATH.to_string())
            .into();
        let aggregate_output_path = env::var("TRACE_GRAPH_AGGREGATE_OUTPUT")
            .ok()
            .map(PathBuf::from);
        let log_level = env::var("TRACE_GRAPH_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        let config = Config {
            allow_list,
            input_path,
            output_path,
            aggregate_output_path,
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GraphError> {
        if self.allow_list.is_empty() {
            return Err(GraphError::InvalidConfig(
                "TRACE_GRAPH_ALLOWED_SERVICES must name at least one service".to_string(),
            ));
        }

        if self.input_path.as_os_str().is_empty() {
            return Err(GraphError::InvalidConfig(
                "TRACE_GRAPH_INPUT cannot be empty".to_string(),
            ));
        }

        let mut output_paths =
            std::iter::once(&self.output_path).chain(&self.aggregate_output_path);
        if output_paths.any(|path| path.as_os_str().is_empty()) {
            return Err(GraphError::InvalidConfig(
                "Output paths cannot be empty".to_string(),
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(GraphError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }
}
