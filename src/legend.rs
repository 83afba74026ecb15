//! Legend derivation and palette cycling.

use crate::models::LegendPosition;
use serde::{Deserialize, Serialize};

/// Control id of the legend managed by this crate. Lives in the map's control
/// namespace, never in the chart-id namespace.
pub const LEGEND_CONTROL_ID: &str = "minichartsLegend";

/// Color of variable `idx`, cycling through `palette`. `None` for an empty palette.
#[inline]
pub fn palette_color(palette: &[String], idx: usize) -> Option<&str> {
    palette.get(idx.checked_rem(palette.len())?).map(String::as_str)
}

/// First `n` colors of the palette, repeating it as needed. Empty for an empty
/// palette.
pub fn cycle_palette(palette: &[String], n: usize) -> Vec<String> {
    (0..n)
        .filter_map(|i| palette_color(palette, i).map(str::to_string))
        .collect()
}

/// Whether a chart with `ncols` variables gets a legend.
pub fn shows_legend(ncols: usize, show: bool) -> bool {
    show && ncols > 1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

/// Legend entries for the given columns, or `None` when no legend should be shown
/// (legend disabled, or a single variable).
pub fn compute_legend(columns: &[String], palette: &[String], show: bool) -> Option<Vec<LegendEntry>> {
    if !shows_legend(columns.len(), show) || palette.is_empty() {
        return None;
    }
    let colors = cycle_palette(palette, columns.len());
    Some(
        columns
            .iter()
            .zip(colors)
            .map(|(label, color)| LegendEntry {
                label: label.clone(),
                color,
            })
            .collect(),
    )
}

/// Legend control as handed to the host map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendControl {
    pub layer_id: String,
    pub position: LegendPosition,
    pub labels: Vec<String>,
    pub colors: Vec<String>,
}

impl LegendControl {
    pub fn new(entries: &[LegendEntry], position: LegendPosition) -> Self {
        Self {
            layer_id: LEGEND_CONTROL_ID.to_string(),
            position,
            labels: entries.iter().map(|e| e.label.clone()).collect(),
            colors: entries.iter().map(|e| e.color.clone()).collect(),
        }
    }
}
