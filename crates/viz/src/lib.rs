//! # awardbook-viz
//!
//! Chart generation for awardbook's aggregate views.
//!
//! Builds chart specifications from the merged table's grouped unique
//! counts, renderable as JSON (for a frontend) or as a self-contained
//! Chart.js HTML page.

use awardbook_explorer::{MergedTable, VENDOR_DISPLAY};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bar count for the top-NAICS chart.
pub const TOP_NAICS_DEFAULT: usize = 20;

/// Errors that can occur while rendering charts.
#[derive(Debug, Error)]
pub enum VizError {
    #[error("Chart serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Chart specification for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    pub chart_type: ChartKind,
    pub title: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

/// Chart type for visualization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

/// Chart data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// A dataset in a chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

/// Chart rendering options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_label: Option<String>,
    pub show_legend: bool,
}

/// Escape HTML special characters to prevent XSS.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

impl ChartSpec {
    /// Create a new chart specification.
    #[must_use]
    pub fn new(chart_type: ChartKind, title: impl Into<String>) -> Self {
        Self {
            chart_type,
            title: title.into(),
            data: ChartData {
                labels: Vec::new(),
                datasets: Vec::new(),
            },
            options: ChartOptions::default(),
        }
    }

    /// Build a single-series bar chart from (label, count) pairs.
    #[must_use]
    pub fn bar_counts(
        title: impl Into<String>,
        series_label: &str,
        counts: &[(String, usize)],
    ) -> Self {
        let mut spec = Self::new(ChartKind::Bar, title);
        spec.data.labels = counts.iter().map(|(label, _)| label.clone()).collect();
        spec.data.datasets.push(Dataset {
            label: series_label.to_string(),
            data: counts.iter().map(|(_, count)| *count as f64).collect(),
            background_color: None,
        });
        spec.options.y_axis_label = Some(series_label.to_string());
        spec
    }

    /// Convert to JSON string for frontend rendering.
    pub fn to_json(&self) -> Result<String, VizError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Generate a self-contained HTML page with embedded Chart.js.
    #[must_use]
    pub fn to_html(&self) -> String {
        // Escape title for HTML context and JSON for script context
        let title = escape_html(&self.title);
        let json = serde_json::to_string(&self)
            .unwrap_or_default()
            .replace("</", "<\\/"); // Prevent script tag breakout

        let chart_type = match self.chart_type {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
</head>
<body>
    <canvas id="chart"></canvas>
    <script>
        const spec = {json};
        const ctx = document.getElementById('chart').getContext('2d');
        new Chart(ctx, {{
            type: '{chart_type}',
            data: spec.data,
            options: {{
                responsive: true,
                plugins: {{
                    title: {{
                        display: true,
                        text: spec.title
                    }},
                    legend: {{
                        display: spec.options.show_legend
                    }}
                }}
            }}
        }});
    </script>
</body>
</html>"#,
            title = title,
            json = json,
            chart_type = chart_type,
        )
    }
}

/// Unique vendors per pool, all pools, busiest first.
#[must_use]
pub fn vendors_by_pool(table: &MergedTable) -> ChartSpec {
    let counts = table.grouped_unique_count("Pool", VENDOR_DISPLAY, None);
    ChartSpec::bar_counts("Vendors per Pool", "Unique vendors", &counts)
}

/// Unique vendors for the top NAICS codes.
#[must_use]
pub fn top_naics(table: &MergedTable, top_n: usize) -> ChartSpec {
    let counts = table.grouped_unique_count("NAICS", VENDOR_DISPLAY, Some(top_n));
    ChartSpec::bar_counts("Top NAICS", "Unique vendors", &counts)
}

/// Unique vendors per domain, busiest first.
#[must_use]
pub fn vendors_by_domain(table: &MergedTable) -> ChartSpec {
    let counts = table.grouped_unique_count("Domain", VENDOR_DISPLAY, None);
    ChartSpec::bar_counts("Domains", "Unique vendors", &counts)
}
