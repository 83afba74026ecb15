//! Add-time defaults.
//!
//! Every optional field of an add request falls back to the value held here. The
//! struct can be loaded from a (partial) JSON file, so a deployment can change
//! its house style without code changes:
//!
//! ```json
//! { "width": 40, "colorPalette": ["#4472C4", "#ED7D31"] }
//! ```

use crate::models::{ChartType, LegendPosition};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// d3 `schemeCategory10`.
pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Defaults {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub width: f64,
    pub height: f64,
    pub opacity: f64,
    pub label_min_size: f64,
    pub label_max_size: f64,
    pub label_style: Option<String>,
    /// Milliseconds.
    pub transition_time: u32,
    pub fill_color: String,
    pub color_palette: Vec<String>,
    pub legend: bool,
    pub legend_position: LegendPosition,
    pub popup_show_title: bool,
    pub popup_show_values: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            chart_type: ChartType::Auto,
            width: 30.0,
            height: 30.0,
            opacity: 1.0,
            label_min_size: 8.0,
            label_max_size: 24.0,
            label_style: None,
            transition_time: 750,
            fill_color: CATEGORY10[0].to_string(),
            color_palette: CATEGORY10.iter().map(|c| c.to_string()).collect(),
            legend: true,
            legend_position: LegendPosition::TopRight,
            popup_show_title: true,
            popup_show_values: true,
        }
    }
}

impl Defaults {
    /// Read defaults from a JSON file; missing keys keep their built-in value.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading defaults from {}", path.display()))?;
        let defaults: Defaults = serde_json::from_str(&raw)
            .with_context(|| format!("parsing defaults in {}", path.display()))?;
        log::debug!("loaded defaults from {}", path.display());
        Ok(defaults)
    }
}
