// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Renders a microsecond duration with one decimal in the largest fitting unit.
pub fn format_duration(duration_us: f64) -> String {
    if duration_us < 1e3 {
        format!("{duration_us:.1}μs")
    } else if duration_us < 1e6 {
        format!("{:.1}ms", duration_us / 1e3)
    } else {
        format!("{:.1}s", duration_us / 1e6)
    }
}
